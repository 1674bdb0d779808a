//! Error types returned from the public API.
//!
//! Internally the crate works with `anyhow::Error`. At the public boundary each error is tagged
//! with an `ErrorType` so that callers can tell a rejected form apart from a failed disk write.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The broad category of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A required field was missing, empty or zero, or a value was not acceptable. Nothing was
    /// written.
    Validation,
    /// A requested PDF file does not exist in the PDF directory.
    NotFound,
    /// Reading or writing the invoice table or a PDF file failed.
    Storage,
    /// The home directory or its `config.json` is missing or invalid.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The error returned by public functions of this crate.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn is_validation(&self) -> bool {
        self.error_type == ErrorType::Validation
    }

    pub fn is_not_found(&self) -> bool {
        self.error_type == ErrorType::NotFound
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The alternate form prints the whole context chain.
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts an internal result into a public `Result` tagged with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
