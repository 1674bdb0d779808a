use crate::model::Amount;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The format used for the `Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether an invoice has been paid.
///
/// The table file uses the French labels. The English names are accepted when reading.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Status {
    #[default]
    #[serde(rename = "Payée", alias = "Paid", alias = "paid")]
    Paid,
    #[serde(rename = "En attente", alias = "Pending", alias = "pending")]
    Pending,
}

serde_plain::derive_display_from_serialize!(Status);
serde_plain::derive_fromstr_from_deserialize!(Status);

/// Returns the name of the PDF file that belongs to `invoice_number`.
pub fn pdf_filename(invoice_number: &str) -> String {
    format!("{invoice_number}.pdf")
}

/// Represents a single row of the invoice table.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InvoiceRecord {
    date: String,
    invoice_number: String,
    description: String,
    /// `None` when the cell was blank in the table file.
    amount: Option<Amount>,
    /// `None` when the cell was blank in the table file.
    status: Option<Status>,
    pdf_filename: String,
    /// Cells from columns this program does not know about, keyed by header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    other_fields: BTreeMap<String, String>,
}

impl InvoiceRecord {
    /// Creates a record. The PDF filename is derived from `invoice_number`.
    pub fn new(
        date: NaiveDate,
        invoice_number: impl Into<String>,
        description: impl Into<String>,
        amount: Amount,
        status: Status,
    ) -> Self {
        let invoice_number = invoice_number.into();
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            pdf_filename: pdf_filename(&invoice_number),
            invoice_number,
            description: description.into(),
            amount: Some(amount),
            status: Some(status),
            other_fields: BTreeMap::new(),
        }
    }

    /// Builds a record from one row of the table file, pairing each value with the header at the
    /// same position.
    pub(crate) fn from_row<S1, S2, I>(headers: &[S1], values: I) -> anyhow::Result<Self>
    where
        S1: AsRef<str>,
        S2: Into<String>,
        I: IntoIterator<Item = S2>,
    {
        let mut record = InvoiceRecord::default();
        for (ix, value) in values.into_iter().map(|s| s.into()).enumerate() {
            let header = headers
                .get(ix)
                .with_context(|| format!("No header found for column index {ix}"))?
                .as_ref();
            record.set_with_header(header, value)?;
        }
        Ok(record)
    }

    pub(crate) fn set_with_header<S1, S2>(&mut self, header: S1, value: S2) -> anyhow::Result<()>
    where
        S1: AsRef<str>,
        S2: Into<String>,
    {
        let header = header.as_ref();
        let value = value.into();

        match InvoiceColumn::from_header(header) {
            Some(col) => match col {
                InvoiceColumn::Date => {
                    if !value.trim().is_empty() {
                        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
                            .with_context(|| format!("Invalid date '{value}'"))?;
                    }
                    self.date = value
                }
                InvoiceColumn::InvoiceNumber => self.invoice_number = value,
                InvoiceColumn::Description => self.description = value,
                InvoiceColumn::Amount => {
                    self.amount = if value.trim().is_empty() {
                        None
                    } else {
                        let amount = Amount::from_str(&value)
                            .with_context(|| format!("Invalid amount '{value}'"))?;
                        Some(amount)
                    }
                }
                InvoiceColumn::Status => {
                    self.status = if value.trim().is_empty() {
                        None
                    } else {
                        let status = Status::from_str(value.trim())
                            .with_context(|| format!("Invalid status '{value}'"))?;
                        Some(status)
                    }
                }
                InvoiceColumn::PdfFilename => self.pdf_filename = value,
            },
            None => {
                let _ = self.other_fields.insert(header.to_string(), value);
            }
        }

        Ok(())
    }

    /// Returns the cell value for `header`, empty if this record has nothing in that column.
    pub(crate) fn get_by_header(&self, header: &str) -> String {
        match InvoiceColumn::from_header(header) {
            Some(InvoiceColumn::Date) => self.date.clone(),
            Some(InvoiceColumn::InvoiceNumber) => self.invoice_number.clone(),
            Some(InvoiceColumn::Description) => self.description.clone(),
            Some(InvoiceColumn::Amount) => {
                self.amount.map(|a| a.to_string()).unwrap_or_default()
            }
            Some(InvoiceColumn::Status) => {
                self.status.map(|s| s.to_string()).unwrap_or_default()
            }
            Some(InvoiceColumn::PdfFilename) => self.pdf_filename.clone(),
            None => self.other_fields.get(header).cloned().unwrap_or_default(),
        }
    }

    /// The invoice date as `YYYY-MM-DD`.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The tax-inclusive total, `None` if the cell is blank.
    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    /// `None` if the cell is blank.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn pdf_filename(&self) -> &str {
        &self.pdf_filename
    }

    pub fn other_fields(&self) -> &BTreeMap<String, String> {
        &self.other_fields
    }
}

/// The columns of a newly created invoice table, in the order they are written.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceColumn {
    Date,
    InvoiceNumber,
    Description,
    Amount,
    Status,
    PdfFilename,
}

serde_plain::derive_display_from_serialize!(InvoiceColumn);
serde_plain::derive_fromstr_from_deserialize!(InvoiceColumn);

impl InvoiceColumn {
    pub const ALL: [InvoiceColumn; 6] = [
        InvoiceColumn::Date,
        InvoiceColumn::InvoiceNumber,
        InvoiceColumn::Description,
        InvoiceColumn::Amount,
        InvoiceColumn::Status,
        InvoiceColumn::PdfFilename,
    ];

    /// Matches a header cell exactly. Returns `None` for headers this program does not know.
    pub fn from_header(header: impl AsRef<str>) -> Option<InvoiceColumn> {
        match header.as_ref() {
            DATE_STR => Some(InvoiceColumn::Date),
            INVOICE_NUMBER_STR => Some(InvoiceColumn::InvoiceNumber),
            DESCRIPTION_STR => Some(InvoiceColumn::Description),
            AMOUNT_STR => Some(InvoiceColumn::Amount),
            STATUS_STR => Some(InvoiceColumn::Status),
            PDF_FILENAME_STR => Some(InvoiceColumn::PdfFilename),
            _ => None,
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            InvoiceColumn::Date => DATE_STR,
            InvoiceColumn::InvoiceNumber => INVOICE_NUMBER_STR,
            InvoiceColumn::Description => DESCRIPTION_STR,
            InvoiceColumn::Amount => AMOUNT_STR,
            InvoiceColumn::Status => STATUS_STR,
            InvoiceColumn::PdfFilename => PDF_FILENAME_STR,
        }
    }
}

pub(super) const DATE_STR: &str = "Date";
pub(super) const INVOICE_NUMBER_STR: &str = "Numéro de Facture";
pub(super) const DESCRIPTION_STR: &str = "Description";
pub(super) const AMOUNT_STR: &str = "Montant TTC";
pub(super) const STATUS_STR: &str = "Statut";
pub(super) const PDF_FILENAME_STR: &str = "Fichier PDF";

/// The fields of the invoice form, as entered by the user and before validation.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NewInvoice {
    pub date: NaiveDate,
    pub invoice_number: String,
    pub description: String,
    pub amount: Amount,
    pub status: Status,
    /// The uploaded PDF. `None` when nothing was uploaded.
    pub pdf: Option<Vec<u8>>,
}

/// A form field that can be reported as missing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    InvoiceNumber,
    Description,
    Amount,
    Pdf,
}

impl Display for FormField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FormField::InvoiceNumber => "invoice number",
            FormField::Description => "description",
            FormField::Amount => "amount",
            FormField::Pdf => "PDF file",
        };
        f.write_str(s)
    }
}

/// Explains why a `NewInvoice` was rejected.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ValidationError {
    missing: Vec<FormField>,
    problems: Vec<String>,
}

impl ValidationError {
    pub fn missing(&self) -> &[FormField] {
        &self.missing
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.problems.is_empty()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            let names: Vec<String> = self.missing.iter().map(|m| m.to_string()).collect();
            parts.push(format!(
                "Please fill in every field and attach a PDF file (missing: {})",
                names.join(", ")
            ));
        }
        parts.extend(self.problems.iter().cloned());
        f.write_str(&parts.join("; "))
    }
}

impl StdError for ValidationError {}

impl NewInvoice {
    /// Checks the required fields and, if they are all present, splits the form into the record
    /// to append and the PDF payload to store. Every problem is reported at once.
    pub fn into_record(self) -> Result<(InvoiceRecord, Vec<u8>), ValidationError> {
        let mut err = ValidationError::default();
        let number = self.invoice_number.trim();
        let description = self.description.trim();

        if number.is_empty() {
            err.missing.push(FormField::InvoiceNumber);
        } else if let Err(e) = check_file_stem(number) {
            err.problems.push(e.to_string());
        }
        if description.is_empty() {
            err.missing.push(FormField::Description);
        }
        if self.amount.is_zero() {
            err.missing.push(FormField::Amount);
        } else if self.amount.is_negative() {
            err.problems
                .push(format!("The amount must not be negative, got {}", self.amount));
        }
        let pdf = match self.pdf {
            Some(bytes) if !bytes.is_empty() => Some(bytes),
            _ => {
                err.missing.push(FormField::Pdf);
                None
            }
        };

        match pdf {
            Some(pdf) if err.is_empty() => {
                let record =
                    InvoiceRecord::new(self.date, number, description, self.amount, self.status);
                Ok((record, pdf))
            }
            _ => Err(err),
        }
    }
}

/// Makes sure `stem` can be used as a file name inside the PDF directory without escaping it.
pub(crate) fn check_file_stem(stem: &str) -> anyhow::Result<()> {
    if stem.is_empty() || stem == "." || stem == ".." || stem.contains(['/', '\\', '\0']) {
        bail!("'{stem}' cannot be used as a file name");
    }
    Ok(())
}
