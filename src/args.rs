//! These structs provide the CLI interface for the factures CLI.

use crate::model::{Amount, Status};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// factures: record invoices and keep their PDF files.
///
/// Each invoice becomes one row of a CSV table (Date, Numéro de Facture, Description,
/// Montant TTC, Statut, Fichier PDF) and its PDF is copied into a directory next to it, named
/// after the invoice number.
///
/// Run `factures init` once to create the data directory, then `factures add` for each invoice.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// By default the data directory is $HOME/factures, the invoice table is
    /// $FACTURES_HOME/factures.csv and PDFs are kept in $FACTURES_HOME/pdf_factures.
    Init(InitArgs),
    /// Add an invoice: store its PDF and append a row to the invoice table.
    Add(AddArgs),
    /// List every invoice and whether its PDF file can be found.
    List,
    /// Write the invoice table again, or a copy of it to another file.
    Export(ExportArgs),
    /// Copy the PDF of an invoice to another location.
    Pdf(PdfArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where factures data and configuration is held. Defaults to ~/factures
    #[arg(long, env = "FACTURES_HOME", default_value_t = default_factures_home())]
    factures_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, factures_home: PathBuf) -> Self {
        Self {
            log_level,
            factures_home: factures_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn factures_home(&self) -> &DisplayPath {
        &self.factures_home
    }
}

/// Args for the `factures init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where to keep the invoice table. Relative paths are relative to the data directory.
    #[arg(long)]
    table_path: Option<PathBuf>,

    /// Where to keep invoice PDFs. Relative paths are relative to the data directory.
    #[arg(long)]
    pdf_dir: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(table_path: Option<PathBuf>, pdf_dir: Option<PathBuf>) -> Self {
        Self {
            table_path,
            pdf_dir,
        }
    }

    pub fn table_path(&self) -> Option<&Path> {
        self.table_path.as_deref()
    }

    pub fn pdf_dir(&self) -> Option<&Path> {
        self.pdf_dir.as_deref()
    }
}

/// Args for the `factures add` command.
///
/// Every field is optional on the command line so that all missing fields can be reported
/// together.
#[derive(Debug, Parser, Clone, Default)]
pub struct AddArgs {
    /// The invoice date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The invoice number. The PDF is stored as <NUMBER>.pdf
    #[arg(long)]
    number: Option<String>,

    /// What the invoice is for.
    #[arg(long)]
    description: Option<String>,

    /// The total amount, tax included, e.g. 249.99
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<Amount>,

    /// paid or pending.
    #[arg(long, default_value_t = Status::Paid)]
    status: Status,

    /// The invoice PDF to store.
    #[arg(long)]
    pdf: Option<PathBuf>,
}

impl AddArgs {
    pub fn new(
        date: Option<NaiveDate>,
        number: impl Into<String>,
        description: impl Into<String>,
        amount: Option<Amount>,
        status: Status,
        pdf: Option<PathBuf>,
    ) -> Self {
        Self {
            date,
            number: Some(number.into()),
            description: Some(description.into()),
            amount,
            status,
            pdf,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn number(&self) -> &str {
        self.number.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn amount(&self) -> Amount {
        self.amount.unwrap_or_default()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pdf(&self) -> Option<&Path> {
        self.pdf.as_deref()
    }
}

/// Args for the `factures export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// Write the table to this file instead of the configured table file.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Args for the `factures pdf` command.
#[derive(Debug, Parser, Clone)]
pub struct PdfArgs {
    /// The invoice number, or the PDF file name as shown in the Fichier PDF column.
    invoice: String,

    /// Where to write the PDF.
    #[arg(long, short = 'o')]
    output: PathBuf,
}

impl PdfArgs {
    pub fn new(invoice: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            invoice: invoice.into(),
            output: output.into(),
        }
    }

    pub fn invoice(&self) -> &str {
        &self.invoice
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

fn default_factures_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("factures"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --factures-home or FACTURES_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("factures")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "factures",
            "--factures-home",
            "/tmp/f",
            "add",
            "--date",
            "2024-01-10",
            "--number",
            "INV-001",
            "--description",
            "Office chairs",
            "--amount",
            "249.99",
            "--status",
            "pending",
            "--pdf",
            "chairs.pdf",
        ])
        .unwrap();
        assert_eq!(args.common().factures_home().path(), Path::new("/tmp/f"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        let Command::Add(add) = args.command() else {
            panic!("expected the add command, got {:?}", args.command());
        };
        assert_eq!(add.date(), NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(add.number(), "INV-001");
        assert_eq!(add.amount().to_string(), "249.99");
        assert_eq!(add.status(), Status::Pending);
        assert_eq!(add.pdf(), Some(Path::new("chairs.pdf")));
    }

    #[test]
    fn test_parse_add_accepts_french_status_and_missing_fields() {
        let args = Args::try_parse_from([
            "factures",
            "--factures-home",
            "/tmp/f",
            "add",
            "--status",
            "En attente",
        ])
        .unwrap();
        let Command::Add(add) = args.command() else {
            panic!("expected the add command");
        };
        assert_eq!(add.status(), Status::Pending);
        assert_eq!(add.number(), "");
        assert!(add.amount().is_zero());
        assert!(add.pdf().is_none());
    }

    #[test]
    fn test_parse_add_rejects_bad_amount() {
        let result = Args::try_parse_from([
            "factures",
            "--factures-home",
            "/tmp/f",
            "add",
            "--amount",
            "lots",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_pdf() {
        let args = Args::try_parse_from([
            "factures",
            "--factures-home",
            "/tmp/f",
            "--log-level",
            "debug",
            "pdf",
            "INV-001",
            "-o",
            "out.pdf",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        let Command::Pdf(pdf) = args.command() else {
            panic!("expected the pdf command");
        };
        assert_eq!(pdf.invoice(), "INV-001");
        assert_eq!(pdf.output(), Path::new("out.pdf"));
    }
}
