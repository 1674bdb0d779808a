//! Types that represent the core data model, such as `InvoiceRecord` and `InvoiceTable`.
mod amount;
mod invoice;
mod table;

pub use amount::{Amount, AmountError};
pub(crate) use invoice::check_file_stem;
pub use invoice::{
    pdf_filename, FormField, InvoiceColumn, InvoiceRecord, NewInvoice, Status, ValidationError,
    DATE_FORMAT,
};
pub use table::InvoiceTable;
