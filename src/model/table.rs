use crate::model::{InvoiceColumn, InvoiceRecord};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The invoice table: a header row and the records below it, in insertion order.
///
/// A table loaded from a file keeps that file's headers, including columns this program does not
/// know about, so that saving it writes the same columns back.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InvoiceTable {
    headers: Vec<String>,
    records: Vec<InvoiceRecord>,
}

impl Default for InvoiceTable {
    fn default() -> Self {
        Self {
            headers: InvoiceColumn::ALL
                .iter()
                .map(|c| c.header().to_string())
                .collect(),
            records: Vec::new(),
        }
    }
}

impl InvoiceTable {
    /// An empty table with the standard columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses CSV data. The first row is the header row. An empty input is an empty table with
    /// the standard columns.
    pub(crate) fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()
            .context("Unable to read the header row")?
            .iter()
            .enumerate()
            .map(|(ix, h)| match ix {
                // Spreadsheet "CSV UTF-8" exports start with a byte order mark.
                0 => h.trim_start_matches('\u{feff}').to_string(),
                _ => h.to_string(),
            })
            .collect();
        if headers.is_empty() {
            return Ok(Self::default());
        }

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                bail!("Encountered a duplicate header '{header}'");
            }
        }

        let mut records = Vec::new();
        for (row_ix, row) in reader.records().enumerate() {
            // Row numbers are 1-based and the header is row 1.
            let row_number = row_ix + 2;
            let row = row.with_context(|| format!("Unable to read row {row_number}"))?;
            if row.len() > headers.len() {
                bail!("A row longer than the headers list was encountered at row {row_number}");
            }
            let record = InvoiceRecord::from_row(headers.as_slice(), row.iter())
                .with_context(|| format!("Unable to parse row {row_number}"))?;
            records.push(record);
        }

        Ok(Self { headers, records })
    }

    /// Writes the whole table as CSV, header row first.
    pub(crate) fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .context("Unable to write the header row")?;
        for record in &self.records {
            writer
                .write_record(self.headers.iter().map(|h| record.get_by_header(h)))
                .with_context(|| {
                    format!("Unable to write invoice '{}'", record.invoice_number())
                })?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Unable to flush CSV data: {}", e.error()))
    }

    /// Returns a new table with `record` added at the end. Standard columns missing from this
    /// table's headers are added so that the new record is written in full.
    pub fn with_record(&self, record: InvoiceRecord) -> Self {
        let mut table = self.clone();
        for column in InvoiceColumn::ALL {
            if !table.headers.iter().any(|h| h == column.header()) {
                table.headers.push(column.header().to_string());
            }
        }
        table.records.push(record);
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&InvoiceRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InvoiceRecord> {
        self.records.iter()
    }
}
