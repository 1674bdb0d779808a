//! PDF command handler.

use crate::args::PdfArgs;
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::pdf_filename;
use crate::{utils, Config, Result};
use anyhow::anyhow;
use std::path::PathBuf;

/// Copies the PDF of one invoice to `args.output()`.
///
/// `args.invoice()` may be an invoice number (`INV-001`) or a file name from the `Fichier PDF`
/// column (`INV-001.pdf`). A name ending in `.pdf` is looked up as a file name first and then as
/// an invoice number.
///
/// # Errors
///
/// - `ErrorType::NotFound` if there is no such PDF.
/// - `ErrorType::Storage` if the PDF cannot be read or the output cannot be written.
pub async fn pdf(config: Config, args: PdfArgs) -> Result<Out<PathBuf>> {
    let mut candidates = Vec::with_capacity(2);
    if args.invoice().ends_with(".pdf") {
        candidates.push(args.invoice().to_string());
    }
    candidates.push(pdf_filename(args.invoice()));

    let pdfs = config.pdf_store();
    let mut found = None;
    for filename in candidates {
        if let Some(bytes) = pdfs.retrieve(&filename).await? {
            found = Some((filename, bytes));
            break;
        }
    }
    let Some((filename, bytes)) = found else {
        return Err(Error::new(
            ErrorType::NotFound,
            anyhow!("PDF file not found for {}", args.invoice()),
        ));
    };

    let output = args.output();
    utils::make_parent_dir(output)
        .await
        .pub_result(ErrorType::Storage)?;
    utils::write(output, &bytes)
        .await
        .pub_result(ErrorType::Storage)?;

    Ok(Out::new(
        format!("Wrote {} ({} bytes) to {}", filename, bytes.len(), output.display()),
        output.to_path_buf(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_pdf_by_number_and_filename() {
        let env = TestEnv::new().await;
        env.insert_test_invoice("INV-001", b"%PDF-1.4 exact").await;

        for name in ["INV-001", "INV-001.pdf"] {
            let output = env.upload_path("out").join(format!("{name}.copy"));
            let out = pdf(env.config(), PdfArgs::new(name, &output))
                .await
                .unwrap();
            assert_eq!(out.structure(), Some(&output));
            assert_eq!(std::fs::read(&output).unwrap(), b"%PDF-1.4 exact");
        }
    }

    #[tokio::test]
    async fn test_pdf_invoice_number_ending_in_pdf() {
        let env = TestEnv::new().await;
        env.insert_test_invoice("scan.pdf", b"%PDF-1.4 scan").await;
        let output = env.upload_path("scan-copy.pdf");

        let out = pdf(env.config(), PdfArgs::new("scan.pdf", &output))
            .await
            .unwrap();

        assert!(out.message().starts_with("Wrote scan.pdf.pdf"));
        assert_eq!(std::fs::read(&output).unwrap(), b"%PDF-1.4 scan");
    }

    #[tokio::test]
    async fn test_pdf_not_found() {
        let env = TestEnv::new().await;
        let output = env.upload_path("nothing.pdf");

        let err = pdf(env.config(), PdfArgs::new("INV-404", &output))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "PDF file not found for INV-404");
        assert!(!output.exists());
    }
}
