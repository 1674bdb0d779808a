//! Configuration file handling for factures.
//!
//! The configuration file is stored at `$FACTURES_HOME/config.json` and contains the location of
//! the invoice table, the location of the PDF directory and backup settings.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult};
use crate::store::{PdfStore, RecordStore};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "factures";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const TABLE_FILE: &str = "factures.csv";
const PDF_DIR: &str = "pdf_factures";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FACTURES_HOME` and from there it loads `$FACTURES_HOME/config.json`. It provides
/// the paths of the invoice table and the PDF directory, and constructs the stores that use them.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its `.backups` subdirectory, the PDF directory and an initial
    /// `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/factures`
    /// - `table_path` - Where the invoice table lives. Relative paths are resolved against `dir`.
    ///   Defaults to `factures.csv`.
    /// - `pdf_dir` - Where invoice PDFs are kept. Relative paths are resolved against `dir`.
    ///   Defaults to `pdf_factures`.
    ///
    /// # Errors
    /// - Returns an error if the directory is already initialized or if any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        table_path: Option<PathBuf>,
        pdf_dir: Option<PathBuf>,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), table_path, pdf_dir)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        table_path: Option<PathBuf>,
        pdf_dir: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the factures home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The factures home is already initialized, '{}' exists",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_file = ConfigFile {
            table_path: table_path.unwrap_or_else(|| PathBuf::from(TABLE_FILE)),
            pdf_dir: pdf_dir.unwrap_or_else(|| PathBuf::from(PDF_DIR)),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            backups,
            config_path,
            config_file,
        };
        utils::make_dir(&config.pdf_dir())
            .await
            .context("Unable to create the PDF directory")?;
        Ok(config)
    }

    /// This will
    /// - validate that the `factures_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(factures_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(factures_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> anyhow::Result<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The factures home is missing, run 'factures init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Returns the invoice table path, resolved against the home directory if it is relative.
    pub fn table_path(&self) -> PathBuf {
        self.resolve(&self.config_file.table_path)
    }

    /// Returns the PDF directory, resolved against the home directory if it is relative.
    pub fn pdf_dir(&self) -> PathBuf {
        self.resolve(&self.config_file.pdf_dir)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(&self.backups, self.backup_copies())
    }

    /// Creates the store for the invoice table. It backs up the table before each save.
    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(self.table_path()).with_backup(self.backup())
    }

    pub fn pdf_store(&self) -> PdfStore {
        PdfStore::new(self.pdf_dir())
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it unchanged if it is absolute.
    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "factures",
///   "config_version": 1,
///   "table_path": "factures.csv",
///   "pdf_dir": "pdf_factures",
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "factures"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the invoice table (relative to the home directory or absolute)
    #[serde(default = "default_table_path")]
    table_path: PathBuf,

    /// Path to the PDF directory (relative to the home directory or absolute)
    #[serde(default = "default_pdf_dir")]
    pdf_dir: PathBuf,

    /// Number of backup copies of the invoice table to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,
}

fn default_table_path() -> PathBuf {
    PathBuf::from(TABLE_FILE)
}

fn default_pdf_dir() -> PathBuf {
    PathBuf::from(PDF_DIR)
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            table_path: default_table_path(),
            pdf_dir: default_pdf_dir(),
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another application
    async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
