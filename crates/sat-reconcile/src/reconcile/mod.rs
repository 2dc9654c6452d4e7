//! Reconciling the invoices of the accounting export against the tax authority's.

mod status;

pub use status::{CANCELLED, CancellationStatus, ComparisonStatus, derive_cancellation};

use crate::Result;
use crate::columns::ColumnKeywords;
use crate::identifier::{DuplicatePolicy, SourceIndex};
use crate::sheet::read_first_table;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One row of the comparison report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRecord {
    pub accounting_id: Option<String>,
    pub authority_id: Option<String>,
    pub status: ComparisonStatus,
    pub payment_status: Option<String>,
    pub sat_status: Option<String>,
    pub cancellation: CancellationStatus,
}

/// How columns are found and duplicates are treated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub keywords: ColumnKeywords,
    pub duplicates: DuplicatePolicy,
}

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    accounting_path: PathBuf,
    authority_path: PathBuf,
    options: ReconcileOptions,
}
impl ReconcileConfig {
    pub fn new(accounting_path: impl Into<PathBuf>, authority_path: impl Into<PathBuf>) -> Self {
        ReconcileConfig {
            accounting_path: accounting_path.into(),
            authority_path: authority_path.into(),
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn accounting_path(&self) -> &Path {
        &self.accounting_path
    }

    pub fn authority_path(&self) -> &Path {
        &self.authority_path
    }

    /// Read both exports and index them by invoice identifier.
    pub fn read(&self) -> Result<ReconcileState> {
        let options = &self.options;

        let accounting = read_first_table(&self.accounting_path)?;
        let accounting =
            SourceIndex::accounting(&accounting, &options.keywords, options.duplicates)?;

        let authority = read_first_table(&self.authority_path)?;
        let authority = SourceIndex::authority(&authority, &options.keywords, options.duplicates)?;

        tracing::debug!(
            "indexed {} accounting and {} authority invoices",
            accounting.len(),
            authority.len()
        );
        Ok(ReconcileState {
            accounting,
            authority,
        })
    }

    /// Shorthand for `read()?.reconcile()`.
    pub fn reconcile(&self) -> Result<Vec<ComparisonRecord>> {
        Ok(self.read()?.reconcile())
    }
}

/// Both exports, indexed and ready to compare.
#[derive(Debug, Clone)]
pub struct ReconcileState {
    pub accounting: SourceIndex,
    pub authority: SourceIndex,
}
impl ReconcileState {
    /// Compare both exports, returning one record per identifier in report order.
    pub fn reconcile(&self) -> Vec<ComparisonRecord> {
        let mut records = reconcile(&self.accounting, &self.authority);
        crate::sorting::sort_records(&mut records);
        records
    }
}

fn reconcile(accounting: &SourceIndex, authority: &SourceIndex) -> Vec<ComparisonRecord> {
    let mut results = Vec::with_capacity(accounting.len());

    for id in accounting.identifiers() {
        let payment_status = accounting.status(id);
        if authority.contains(id) {
            let sat_status = authority.status(id);
            results.push(ComparisonRecord {
                accounting_id: Some(id.to_owned()),
                authority_id: Some(id.to_owned()),
                status: ComparisonStatus::Match,
                payment_status: payment_status.map(ToOwned::to_owned),
                sat_status: sat_status.map(ToOwned::to_owned),
                cancellation: derive_cancellation(payment_status, sat_status),
            });
        } else {
            results.push(ComparisonRecord {
                accounting_id: Some(id.to_owned()),
                authority_id: None,
                status: ComparisonStatus::MissingInAuthority,
                payment_status: payment_status.map(ToOwned::to_owned),
                sat_status: None,
                cancellation: CancellationStatus::NotCancelled,
            });
        }
    }

    for id in authority.identifiers().filter(|id| !accounting.contains(id)) {
        let sat_status = authority.status(id);
        results.push(ComparisonRecord {
            accounting_id: None,
            authority_id: Some(id.to_owned()),
            status: ComparisonStatus::OnlyInAuthority,
            payment_status: None,
            sat_status: sat_status.map(ToOwned::to_owned),
            cancellation: derive_cancellation(None, sat_status),
        });
    }

    results
}

/// Row counts of a reconciliation, per comparison and cancellation status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub total: usize,
    pub by_status: BTreeMap<ComparisonStatus, usize>,
    pub by_cancellation: BTreeMap<CancellationStatus, usize>,
}

impl ReconcileSummary {
    pub fn from_records(records: &[ComparisonRecord]) -> Self {
        let mut summary = ReconcileSummary {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            *summary.by_status.entry(record.status).or_default() += 1;
            *summary.by_cancellation.entry(record.cancellation).or_default() += 1;
        }
        summary
    }

    pub fn count(&self, status: ComparisonStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn cancellations(&self, cancellation: CancellationStatus) -> usize {
        self.by_cancellation
            .get(&cancellation)
            .copied()
            .unwrap_or(0)
    }

    /// Rows that need attention: anything unmatched or with a cancellation mismatch.
    pub fn discrepancies(&self) -> usize {
        self.count(ComparisonStatus::MissingInAuthority)
            + self.count(ComparisonStatus::OnlyInAuthority)
            + self.cancellations(CancellationStatus::Mismatch)
    }
}
