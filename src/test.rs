//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, NewInvoice, Status};
use crate::Config;
use chrono::NaiveDate;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment that sets up a factures home directory with its Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with an initialized home directory and no invoices.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("factures");
        let config = Config::create(&root, None, None).await.unwrap();
        Self { temp_dir, config }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A path outside of the home directory, for files a user would pick or receive.
    pub fn upload_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("uploads").join(name)
    }

    /// Writes a file that a user could pass to `factures add --pdf`.
    pub fn write_upload(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.upload_path(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Reads a PDF from the configured PDF directory.
    pub async fn stored_pdf(&self, filename: &str) -> Option<Vec<u8>> {
        self.config.pdf_store().retrieve(filename).await.unwrap()
    }

    /// Appends an invoice with a fixed date, description and amount through the record store.
    pub async fn insert_test_invoice(&self, invoice_number: &str, pdf: &[u8]) {
        let records = self.config.record_store();
        let table = records.load().await.unwrap();
        let invoice = NewInvoice {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            invoice_number: invoice_number.to_string(),
            description: format!("Test invoice {invoice_number}"),
            amount: Amount::new(100.into()),
            status: Status::Pending,
            pdf: Some(pdf.to_vec()),
        };
        records
            .append(&table, invoice, &self.config.pdf_store())
            .await
            .unwrap();
    }
}
