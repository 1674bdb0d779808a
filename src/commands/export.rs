//! Export command handler.

use crate::args::ExportArgs;
use crate::commands::Out;
use crate::{Config, Result};
use std::path::PathBuf;

/// Loads the invoice table and writes it out in full.
///
/// Without an output path the configured table file is rewritten. With one, the table is written
/// to that file and the configured table file is left alone.
///
/// # Returns
///
/// On success, returns an `Out` containing the path that was written.
///
/// # Errors
///
/// - `ErrorType::Storage` if the table cannot be loaded or written.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let records = config.record_store();
    let table = records.load().await?;

    let destination = match args.output() {
        None => {
            records.save(&table).await?;
            records.path().to_path_buf()
        }
        Some(output) => {
            records.export(&table, output).await?;
            output.to_path_buf()
        }
    };

    let message = format!(
        "Exported {} invoice{} to {}",
        table.len(),
        if table.len() == 1 { "" } else { "s" },
        destination.display()
    );
    Ok(Out::new(message, destination))
}
