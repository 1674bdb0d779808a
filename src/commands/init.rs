use crate::commands::Out;
use crate::{Config, Result};
use std::path::{Path, PathBuf};

/// Creates the home directory, its subdirectories, the PDF directory and an initial
/// `config.json`.
///
/// # Arguments
/// - `factures_home` - The directory that will be the root of the home directory, e.g.
///   `$HOME/factures`
/// - `table_path` - Optional location of the invoice table, relative to `factures_home` or
///   absolute.
/// - `pdf_dir` - Optional location of the PDF directory, relative to `factures_home` or absolute.
///
/// # Errors
/// - Returns an error if the home is already initialized or any file operation fails.
pub async fn init(
    factures_home: &Path,
    table_path: Option<&Path>,
    pdf_dir: Option<&Path>,
) -> Result<Out<PathBuf>> {
    let config = Config::create(
        factures_home,
        table_path.map(Path::to_path_buf),
        pdf_dir.map(Path::to_path_buf),
    )
    .await?;
    Ok(Out::new(
        format!(
            "Successfully created the factures directory at {}",
            config.root().display()
        ),
        config.config_path().to_path_buf(),
    ))
}
