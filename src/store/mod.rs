//! Durable storage: the invoice table file and the directory of invoice PDFs.
//!
//! The two are linked only by naming convention. A record's `Fichier PDF` column names a file in
//! the PDF directory, but nothing checks that the file is there.

mod pdfs;
mod records;

pub use pdfs::PdfStore;
pub use records::RecordStore;
