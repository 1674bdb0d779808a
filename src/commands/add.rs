//! Add command handler.

use crate::args::AddArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{InvoiceRecord, NewInvoice};
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use tracing::warn;

/// Stores the invoice PDF and appends a row to the invoice table.
///
/// The PDF named by `args` is read first. A PDF path that does not exist is treated like a
/// missing upload, so it is reported together with any other missing field.
///
/// # Returns
///
/// On success, returns an `Out` containing the appended record.
///
/// # Errors
///
/// - `ErrorType::Validation` if the invoice number, description, amount or PDF is missing.
/// - `ErrorType::Storage` if the table or the PDF cannot be read or written.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<InvoiceRecord>> {
    let pdf = match args.pdf() {
        Some(path) => {
            let bytes = utils::read_bytes_if_exists(path)
                .await
                .with_context(|| format!("Unable to read the PDF file {}", path.display()))
                .pub_result(ErrorType::Storage)?;
            if bytes.is_none() {
                warn!("The PDF file {} does not exist", path.display());
            }
            bytes
        }
        None => None,
    };

    let invoice = NewInvoice {
        date: args.date().unwrap_or_else(|| Local::now().date_naive()),
        invoice_number: args.number().to_string(),
        description: args.description().to_string(),
        amount: args.amount(),
        status: args.status(),
        pdf,
    };

    let records = config.record_store();
    let table = records.load().await?;
    let table = records
        .append(&table, invoice, &config.pdf_store())
        .await?;

    // append always adds a row, so there is a last one
    let record = table
        .last()
        .cloned()
        .context("The invoice table is empty after appending")
        .pub_result(ErrorType::Storage)?;
    let message = format!(
        "Added invoice {} ({} invoice{} in the table)",
        record.invoice_number(),
        table.len(),
        if table.len() == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, record))
}
