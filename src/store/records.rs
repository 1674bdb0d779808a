//! The invoice table file: load it whole, append one invoice, save it whole.
//!
//! There is no locking. Two processes saving the same file race and the last write wins.

use crate::backup::Backup;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{InvoiceTable, NewInvoice};
use crate::store::PdfStore;
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reads and writes the invoice table file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RecordStore {
    path: PathBuf,
    backup: Option<Backup>,
}

impl RecordStore {
    /// Creates a store for the table file at `path`. Nothing is read or written until `load` or
    /// `save` is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    /// Copy the existing table file with `backup` before each save overwrites it.
    pub fn with_backup(mut self, backup: Backup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole table. A missing file is an empty table with the standard columns.
    ///
    /// # Errors
    /// - `ErrorType::Storage` if the file cannot be read or is not a valid invoice table.
    pub async fn load(&self) -> Result<InvoiceTable> {
        let data = utils::read_bytes_if_exists(&self.path)
            .await
            .pub_result(ErrorType::Storage)?;
        let Some(data) = data else {
            debug!(
                "No invoice table at {}, starting with an empty one",
                self.path.display()
            );
            return Ok(InvoiceTable::new());
        };
        let table = InvoiceTable::from_csv(&data)
            .with_context(|| format!("Unable to load the invoice table {}", self.path.display()))
            .pub_result(ErrorType::Storage)?;
        debug!(
            "Loaded {} invoices from {}",
            table.len(),
            self.path.display()
        );
        Ok(table)
    }

    /// Validates `invoice`, stores its PDF in `pdfs`, and saves a new table made of `table` plus
    /// the new record at the end. The new table is returned; `table` itself is never changed.
    ///
    /// Validation happens before anything is written, so a rejected invoice leaves both the table
    /// file and the PDF directory as they were.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if a required field or the PDF is missing.
    /// - `ErrorType::Storage` if the PDF or the table cannot be written.
    pub async fn append(
        &self,
        table: &InvoiceTable,
        invoice: NewInvoice,
        pdfs: &PdfStore,
    ) -> Result<InvoiceTable> {
        let (record, pdf) = match invoice.into_record() {
            Ok(ok) => ok,
            Err(e) => {
                warn!("Invoice rejected: {e}");
                return Err(Error::new(ErrorType::Validation, e));
            }
        };

        let filename = pdfs.store(record.invoice_number(), &pdf).await?;
        debug_assert_eq!(filename, record.pdf_filename());

        let updated = table.with_record(record);
        self.save(&updated).await?;
        info!(
            "Appended invoice {} to {}",
            filename.trim_end_matches(".pdf"),
            self.path.display()
        );
        Ok(updated)
    }

    /// Writes the whole table to the table file, replacing what was there.
    ///
    /// # Errors
    /// - `ErrorType::Storage` if the file cannot be written.
    pub async fn save(&self, table: &InvoiceTable) -> Result<()> {
        let data = table.to_csv().pub_result(ErrorType::Storage)?;
        if let Some(backup) = &self.backup {
            if self.path.is_file() {
                backup
                    .copy_file(&self.path)
                    .await
                    .context("Unable to back up the invoice table before saving")
                    .pub_result(ErrorType::Storage)?;
            }
        }
        write_table(&self.path, &data)
            .await
            .pub_result(ErrorType::Storage)?;
        debug!("Saved {} invoices to {}", table.len(), self.path.display());
        Ok(())
    }

    /// Writes the whole table to `destination` in the same format as the table file. The table
    /// file itself is not touched.
    ///
    /// # Errors
    /// - `ErrorType::Storage` if the file cannot be written.
    pub async fn export(&self, table: &InvoiceTable, destination: &Path) -> Result<()> {
        let data = table.to_csv().pub_result(ErrorType::Storage)?;
        write_table(destination, &data)
            .await
            .pub_result(ErrorType::Storage)?;
        debug!(
            "Exported {} invoices to {}",
            table.len(),
            destination.display()
        );
        Ok(())
    }
}

async fn write_table(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    utils::make_parent_dir(path).await?;
    utils::write(path, data)
        .await
        .with_context(|| format!("Unable to save the invoice table {}", path.display()))
}
