use std::fmt;
use std::path::PathBuf;

/// Which export a table was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The accounting system export (Odoo).
    Accounting,
    /// The tax authority export (SAT).
    Authority,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Accounting => f.write_str("Odoo"),
            Source::Authority => f.write_str("SAT"),
        }
    }
}

/// A mandatory column could not be located by any of its keywords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "no column matches any of the keywords {keywords:?} in the {origin} file.\nColumns found: {columns:?}"
)]
pub struct MissingColumnError {
    pub keywords: Vec<String>,
    pub origin: Source,
    pub columns: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    MissingColumn(#[from] MissingColumnError),

    #[error("invoice {identifier} appears {rows} times in the {origin} file")]
    DuplicateIdentifier {
        origin: Source,
        identifier: String,
        rows: usize,
    },

    #[error("failed to read spreadsheet {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("spreadsheet {} contains no worksheets", path.display())]
    EmptyWorkbook { path: PathBuf },

    #[error("failed to build report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("cannot write {}: reports are always saved as .xlsx", path.display())]
    UnsupportedOutput { path: PathBuf },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
