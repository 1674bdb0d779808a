//! The PDF directory: one `<invoice number>.pdf` file per invoice.

use crate::error::{ErrorType, IntoResult};
use crate::model::{check_file_stem, pdf_filename};
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores and retrieves invoice PDF files in a flat directory.
///
/// Files are named after the invoice number. Storing a PDF for a number that already has one
/// replaces the old file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PdfStore {
    dir: PathBuf,
}

impl PdfStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns where `filename` lives in the PDF directory. The file may not exist.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if `filename` is not a plain file name.
    pub fn path(&self, filename: &str) -> Result<PathBuf> {
        check_file_stem(filename).pub_result(ErrorType::Validation)?;
        Ok(self.dir.join(filename))
    }

    /// Writes `payload` to `<invoice_number>.pdf`, creating the directory if needed, and returns
    /// the file name.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if `invoice_number` cannot be used as a file name.
    /// - `ErrorType::Storage` if the directory or file cannot be written.
    pub async fn store(&self, invoice_number: &str, payload: &[u8]) -> Result<String> {
        let filename = pdf_filename(invoice_number);
        let path = self.path(&filename)?;
        utils::make_dir(&self.dir)
            .await
            .context("Unable to create the PDF directory")
            .pub_result(ErrorType::Storage)?;
        utils::write(&path, payload)
            .await
            .pub_result(ErrorType::Storage)?;
        debug!("Stored {} bytes in {}", payload.len(), path.display());
        Ok(filename)
    }

    /// Reads the PDF named `filename`. Returns `None` when there is no such file.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if `filename` is not a plain file name.
    /// - `ErrorType::Storage` if the file exists but cannot be read.
    pub async fn retrieve(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(filename)?;
        let found = utils::read_bytes_if_exists(&path)
            .await
            .pub_result(ErrorType::Storage)?;
        if found.is_none() {
            debug!("No PDF at {}", path.display());
        }
        Ok(found)
    }
}
