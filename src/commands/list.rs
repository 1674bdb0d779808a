//! List command handler.

use crate::commands::Out;
use crate::model::InvoiceRecord;
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// What was found in the PDF directory for one invoice.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum PdfState {
    /// The PDF exists and was read.
    Found { path: PathBuf, size: usize },
    /// There is no file with the name in the `Fichier PDF` column.
    Missing,
    /// The file could not be read, or the name in the `Fichier PDF` column is not usable.
    Unreadable { reason: String },
}

/// One row of the listing: an invoice and the state of its PDF.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Listing {
    pub invoice: InvoiceRecord,
    pub pdf: PdfState,
}

/// Loads the invoice table and looks up the PDF of every row.
///
/// A PDF that is missing or cannot be read produces a warning for that row only. Every row is
/// listed regardless.
///
/// # Errors
///
/// - `ErrorType::Storage` if the table cannot be loaded.
pub async fn list(config: Config) -> Result<Out<Vec<Listing>>> {
    let records = config.record_store();
    let pdfs = config.pdf_store();
    let table = records.load().await?;

    let mut rows = Vec::with_capacity(table.len());
    for invoice in table.iter() {
        let filename = invoice.pdf_filename();
        let pdf = match pdfs.retrieve(filename).await {
            Ok(Some(bytes)) => PdfState::Found {
                path: pdfs.dir().join(filename),
                size: bytes.len(),
            },
            Ok(None) => {
                warn!(
                    "PDF file not found for invoice {} ({})",
                    invoice.invoice_number(),
                    filename
                );
                PdfState::Missing
            }
            Err(e) => {
                warn!(
                    "Unable to read the PDF of invoice {}: {e}",
                    invoice.invoice_number()
                );
                PdfState::Unreadable {
                    reason: e.to_string(),
                }
            }
        };
        rows.push(Listing {
            invoice: invoice.clone(),
            pdf,
        });
    }

    let missing = rows
        .iter()
        .filter(|r| !matches!(r.pdf, PdfState::Found { .. }))
        .count();
    let mut message = format!(
        "{} invoice{} in {}",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" },
        records.path().display()
    );
    if missing > 0 {
        message.push_str(&format!(", {missing} without a readable PDF"));
    }
    for row in &rows {
        message.push('\n');
        message.push_str(&render(row));
    }
    Ok(Out::new(message, rows))
}

fn render(row: &Listing) -> String {
    let invoice = &row.invoice;
    let pdf = match &row.pdf {
        PdfState::Found { path, size } => format!("{} ({size} bytes)", path.display()),
        PdfState::Missing => format!("{} (missing)", invoice.pdf_filename()),
        PdfState::Unreadable { .. } => format!("{} (unreadable)", invoice.pdf_filename()),
    };
    format!(
        "{} | {} | {} | {} | {} | {}",
        invoice.date(),
        invoice.invoice_number(),
        invoice.description(),
        invoice
            .amount()
            .map(|a| a.to_string())
            .unwrap_or_default(),
        invoice
            .status()
            .map(|s| s.to_string())
            .unwrap_or_default(),
        pdf
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_list_empty() {
        let env = TestEnv::new().await;
        let out = list(env.config()).await.unwrap();
        assert!(out.message().starts_with("0 invoices in "));
        assert!(out.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_missing_pdf_per_row() {
        let env = TestEnv::new().await;
        env.insert_test_invoice("INV-001", b"%PDF one").await;
        env.insert_test_invoice("INV-002", b"%PDF two").await;
        env.insert_test_invoice("INV-003", b"%PDF three").await;
        std::fs::remove_file(env.config().pdf_dir().join("INV-002.pdf")).unwrap();

        let out = list(env.config()).await.unwrap();

        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].pdf,
            PdfState::Found {
                path: env.config().pdf_dir().join("INV-001.pdf"),
                size: 8
            }
        );
        assert_eq!(rows[1].pdf, PdfState::Missing);
        assert!(matches!(rows[2].pdf, PdfState::Found { size: 10, .. }));
        assert!(out.message().contains("3 invoices"));
        assert!(out.message().contains("1 without a readable PDF"));
        assert!(out.message().contains("INV-002.pdf (missing)"));
    }

    #[tokio::test]
    async fn test_list_unusable_file_name() {
        let env = TestEnv::new().await;
        let table = "Numéro de Facture,Fichier PDF\nX-1,../secret.pdf\n";
        std::fs::write(env.config().table_path(), table).unwrap();

        let out = list(env.config()).await.unwrap();

        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0].pdf, PdfState::Unreadable { .. }));
    }
}
