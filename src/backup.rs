//! Backup management for the invoice table.
//!
//! Every save rewrites the whole table file, so the previous version is copied aside first.

use crate::{model::DATE_FORMAT, utils};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Copies `file` into the backups directory.
    ///
    /// The filename format is `{file name}.YYYY-MM-DD-NNN` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file, or `None` when `backup_copies` is zero.
    pub(crate) async fn copy_file(&self, file: &Path) -> Result<Option<PathBuf>> {
        if self.backup_copies == 0 {
            return Ok(None);
        }
        let prefix = file
            .file_name()
            .with_context(|| format!("Cannot back up '{}', it has no file name", file.display()))?
            .to_string_lossy()
            .to_string();

        utils::make_dir(&self.backups_dir).await?;
        let date = today();
        let seq = self.next_sequence_number(&prefix, &date).await?;
        let path = self.backups_dir.join(format!("{prefix}.{date}-{seq:03}"));

        utils::copy(file, &path).await?;
        debug!("Backed up {} to {}", file.display(), path.display());

        self.rotate(&prefix).await?;
        Ok(Some(path))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;
        for name in self.backup_names(prefix).await? {
            if let Some((file_date, seq)) = parse_backup_name(&name, prefix) {
                if file_date == date {
                    max_seq = max_seq.max(seq);
                }
            }
        }
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut names = self.backup_names(prefix).await?;

        // Oldest first. Sequence numbers can outgrow their padding, so compare them as numbers.
        names.sort_by_cached_key(|name| {
            parse_backup_name(name, prefix).map(|(date, seq)| (date.to_string(), seq))
        });

        let to_delete = names.len().saturating_sub(self.backup_copies as usize);
        for name in names.into_iter().take(to_delete) {
            let path = self.backups_dir.join(&name);
            utils::remove(&path).await?;
            debug!("Removed old backup {}", path.display());
        }

        Ok(())
    }

    /// Lists the names of the files in the backups directory that are backups of `prefix`.
    async fn backup_names(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if parse_backup_name(&name, prefix).is_some() {
                names.push(name);
            }
        }
        Ok(names)
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Splits a backup filename of the form `{prefix}.{YYYY-MM-DD}-{NNN}` into its date and sequence
/// number. Returns None if the filename doesn't match the expected pattern.
fn parse_backup_name<'a>(filename: &'a str, prefix: &str) -> Option<(&'a str, u32)> {
    let remainder = filename.strip_prefix(prefix)?.strip_prefix('.')?;
    let (date, seq) = remainder.rsplit_once('-')?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    if seq.is_empty() || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((date, seq.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_backup_name() {
        assert_eq!(
            parse_backup_name("factures.csv.2025-12-14-001", "factures.csv"),
            Some(("2025-12-14", 1))
        );
        assert_eq!(
            parse_backup_name("factures.csv.2025-12-14-042", "factures.csv"),
            Some(("2025-12-14", 42))
        );
        // Wrong prefix
        assert_eq!(
            parse_backup_name("other.csv.2025-12-14-001", "factures.csv"),
            None
        );
        // Not a date
        assert_eq!(
            parse_backup_name("factures.csv.yesterday-001", "factures.csv"),
            None
        );
        // No sequence number
        assert_eq!(parse_backup_name("factures.csv.2025-12-14-", "factures.csv"), None);
        assert_eq!(parse_backup_name("factures.csv", "factures.csv"), None);
    }

    #[tokio::test]
    async fn test_copy_file_sequence_numbers() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("factures.csv");
        utils::write(&table, "v1").await.unwrap();
        let backup = Backup::new(dir.path().join(".backups"), 5);

        let first = backup.copy_file(&table).await.unwrap().unwrap();
        let second = backup.copy_file(&table).await.unwrap().unwrap();

        let date = today();
        assert_eq!(
            first.file_name().unwrap().to_string_lossy(),
            format!("factures.csv.{date}-001")
        );
        assert_eq!(
            second.file_name().unwrap().to_string_lossy(),
            format!("factures.csv.{date}-002")
        );
        assert_eq!(utils::read(&second).await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_copy_file_rotates() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("factures.csv");
        let backups_dir = dir.path().join(".backups");
        let backup = Backup::new(&backups_dir, 2);

        for i in 0..4 {
            utils::write(&table, format!("v{i}")).await.unwrap();
            backup.copy_file(&table).await.unwrap();
        }

        let mut names = backup.backup_names("factures.csv").await.unwrap();
        names.sort();
        assert_eq!(names.len(), 2);
        let date = today();
        assert_eq!(
            names,
            vec![
                format!("factures.csv.{date}-003"),
                format!("factures.csv.{date}-004")
            ]
        );
        let newest = backups_dir.join(&names[1]);
        assert_eq!(utils::read(&newest).await.unwrap(), "v3");
    }

    #[tokio::test]
    async fn test_rotate_past_three_digit_sequence() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("factures.csv");
        let backups_dir = dir.path().join(".backups");
        utils::make_dir(&backups_dir).await.unwrap();
        let date = today();
        for seq in 995..=999 {
            let name = format!("factures.csv.{date}-{seq:03}");
            utils::write(backups_dir.join(name), "old").await.unwrap();
        }
        utils::write(&table, "newest").await.unwrap();
        let backup = Backup::new(&backups_dir, 5);

        let created = backup.copy_file(&table).await.unwrap().unwrap();

        assert_eq!(
            created.file_name().unwrap().to_string_lossy(),
            format!("factures.csv.{date}-1000")
        );
        assert_eq!(utils::read(&created).await.unwrap(), "newest");
        assert!(!backups_dir.join(format!("factures.csv.{date}-995")).exists());
        assert_eq!(backup.backup_names("factures.csv").await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_copy_file_disabled() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("factures.csv");
        utils::write(&table, "v1").await.unwrap();
        let backup = Backup::new(dir.path().join(".backups"), 0);
        assert!(backup.copy_file(&table).await.unwrap().is_none());
        assert!(!dir.path().join(".backups").exists());
    }
}
