mod backup;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod store;
#[cfg(test)]
mod test;
mod utils;

pub use backup::Backup;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
