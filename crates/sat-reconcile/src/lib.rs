pub mod columns;
mod error;
pub mod identifier;
pub mod normalize;
pub mod reconcile;
pub mod report;
pub mod sheet;
mod sorting;

pub use error::{MissingColumnError, ReconcileError, Result, Source};

use std::path::{Path, PathBuf};

use reconcile::{ReconcileConfig, ReconcileSummary};
use report::{Report, ReportOptions};

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResult {
    /// Where the report was written.
    pub path: PathBuf,
    pub summary: ReconcileSummary,
}

/// Compare an Odoo export against a SAT export and write the comparison
/// report to `output`, using the default column keywords.
pub fn reconcile(
    accounting: impl AsRef<Path>,
    authority: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<ReportResult> {
    let config = ReconcileConfig::new(accounting.as_ref(), authority.as_ref());
    write_comparison(&config, &ReportOptions::default(), output.as_ref())
}

/// Run a configured reconciliation and write the report.
///
/// Both inputs are read and compared before anything is written, so a missing
/// column never produces an output file.
pub fn write_comparison(
    config: &ReconcileConfig,
    options: &ReportOptions,
    output: &Path,
) -> Result<ReportResult> {
    report::ensure_xlsx(output)?;
    let records = config.reconcile()?;
    let summary = ReconcileSummary::from_records(&records);

    let report = Report::comparison(&records, options);
    let path = report::save_report(&report, output)?;
    Ok(ReportResult { path, summary })
}

/// Copy every worksheet of `input` to `output`, applying the report's header,
/// column width and amount formatting. Cells keep their positions and dates
/// keep a date format.
pub fn format_workbook(input: &Path, output: &Path, options: &ReportOptions) -> Result<PathBuf> {
    report::ensure_xlsx(output)?;
    let tables = sheet::read_tables(input)?;
    let report = Report::from_tables(tables, options);
    report::save_report(&report, output)
}
