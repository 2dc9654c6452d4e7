//! Canonical invoice identifiers and per-source status lookup.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::columns::{ColumnKeywords, find_column, require_column};
use crate::error::{ReconcileError, Result, Source};
use crate::normalize::{normalize_folio, normalize_identifier, normalize_status};
use crate::sheet::Table;

/// What to do when one export lists the same invoice more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The status of the first row wins.
    #[default]
    KeepFirst,
    /// The status of the last row wins.
    KeepLast,
    /// Fail with [`ReconcileError::DuplicateIdentifier`].
    Reject,
}

/// Identifier of the accounting export: the trimmed, upper-cased number.
pub fn accounting_identifier(table: &Table, row: usize, number: usize) -> String {
    normalize_identifier(&table.cell(row, number).to_string())
}

/// Identifier of the authority export: series followed by the padded folio.
pub fn authority_identifier(table: &Table, row: usize, series: usize, folio: usize) -> String {
    let series = table.cell(row, series).to_string();
    let folio = normalize_folio(table.cell(row, folio));
    normalize_identifier(&format!("{}{folio}", series.trim()))
}

/// All identifiers of one export, each with its (optional) status.
///
/// `status` is `None` for every entry when the export has no status column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIndex {
    pub origin: Source,
    pub has_status: bool,
    entries: BTreeMap<String, String>,
}

impl SourceIndex {
    pub fn new(origin: Source, has_status: bool) -> Self {
        SourceIndex {
            origin,
            has_status,
            entries: BTreeMap::new(),
        }
    }

    /// Index the accounting export by invoice number.
    pub fn accounting(
        table: &Table,
        keywords: &ColumnKeywords,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        let origin = Source::Accounting;
        let number = require_column(table, keywords.number.as_slice(), origin)?;
        let status = find_column(table, keywords.payment_status.as_slice());
        tracing::debug!(
            "{origin}: number column '{}', status column {:?}",
            table.columns[number],
            status.map(|index| &table.columns[index])
        );

        let rows = (0..table.rows.len())
            .filter(|&row| !table.cell(row, number).is_empty())
            .map(|row| (row, accounting_identifier(table, row, number)));
        Self::build(table, origin, status, rows, policy)
    }

    /// Index the authority export by series and folio.
    pub fn authority(
        table: &Table,
        keywords: &ColumnKeywords,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        let origin = Source::Authority;
        let series = require_column(table, keywords.series.as_slice(), origin)?;
        let folio = require_column(table, keywords.folio.as_slice(), origin)?;
        let status = find_column(table, keywords.sat_status.as_slice());
        tracing::debug!(
            "{origin}: series column '{}', folio column '{}', status column {:?}",
            table.columns[series],
            table.columns[folio],
            status.map(|index| &table.columns[index])
        );

        let rows = (0..table.rows.len())
            .filter(|&row| {
                !(table.cell(row, series).is_empty() && table.cell(row, folio).is_empty())
            })
            .map(|row| (row, authority_identifier(table, row, series, folio)));
        Self::build(table, origin, status, rows, policy)
    }

    fn build(
        table: &Table,
        origin: Source,
        status: Option<usize>,
        rows: impl Iterator<Item = (usize, String)>,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        let mut index = SourceIndex::new(origin, status.is_some());
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();

        for (row, identifier) in rows {
            let value = status
                .map(|column| normalize_status(table.cell(row, column)))
                .unwrap_or_default();
            *seen.entry(identifier.clone()).or_default() += 1;
            index.insert(identifier, value, policy);
        }

        for (identifier, rows) in seen.into_iter().filter(|(_, rows)| *rows > 1) {
            if policy == DuplicatePolicy::Reject {
                return Err(ReconcileError::DuplicateIdentifier {
                    origin,
                    identifier,
                    rows,
                });
            }
            let kept = match policy {
                DuplicatePolicy::KeepLast => "last",
                _ => "first",
            };
            tracing::warn!(
                "{origin}: invoice {identifier} appears {rows} times, keeping the {kept} status"
            );
        }

        Ok(index)
    }

    pub fn insert(&mut self, identifier: String, status: String, policy: DuplicatePolicy) {
        match self.entries.entry(identifier) {
            Entry::Vacant(entry) => {
                entry.insert(status);
            }
            Entry::Occupied(mut entry) => {
                if policy == DuplicatePolicy::KeepLast {
                    entry.insert(status);
                }
            }
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Status of an identifier, or `None` if the identifier is unknown or the
    /// export has no status column.
    pub fn status(&self, identifier: &str) -> Option<&str> {
        if !self.has_status {
            return None;
        }
        self.entries.get(identifier).map(String::as_str)
    }

    /// Identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        let mut table = Table::new("Sheet1", columns.iter().map(|c| (*c).to_owned()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    fn text(value: &str) -> CellValue {
        CellValue::from(value)
    }

    #[test]
    fn accounting_identifier_is_case_stable() {
        let table = table(&["Numero"], vec![vec![text(" a001 ")], vec![text("A001")]]);
        assert_eq!(accounting_identifier(&table, 0, 0), "A001");
        assert_eq!(accounting_identifier(&table, 1, 0), "A001");
    }

    #[test]
    fn accounting_identifier_from_number_cell() {
        let table = table(&["Numero"], vec![vec![CellValue::Number(1234.0)]]);
        assert_eq!(accounting_identifier(&table, 0, 0), "1234");
    }

    #[test]
    fn authority_identifier_joins_series_and_folio() {
        let table = table(
            &["Serie", "Folio"],
            vec![
                vec![text(" f "), CellValue::Number(7.0)],
                vec![text("INV"), text("A7")],
                vec![text("F"), CellValue::Number(123456.0)],
            ],
        );
        assert_eq!(authority_identifier(&table, 0, 0, 1), "F00007");
        assert_eq!(authority_identifier(&table, 1, 0, 1), "INV000A7");
        assert_eq!(authority_identifier(&table, 2, 0, 1), "F123456");
    }

    #[test]
    fn accounting_index_reads_status() {
        let table = table(
            &["Numero", "Estado en pago"],
            vec![
                vec![text("F001"), text(" Cancelado")],
                vec![text("F002"), text("Pagado")],
                vec![CellValue::Empty, text("Pagado")],
            ],
        );
        let keywords = ColumnKeywords::default();
        let index = SourceIndex::accounting(&table, &keywords, DuplicatePolicy::KeepFirst).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.status("F001"), Some("cancelado"));
        assert_eq!(index.status("F002"), Some("pagado"));
        assert_eq!(index.identifiers().collect::<Vec<_>>(), ["F001", "F002"]);
    }

    #[test]
    fn index_without_status_column() {
        let table = table(
            &["Serie", "Folio"],
            vec![vec![text("F"), CellValue::Number(1.0)]],
        );
        let keywords = ColumnKeywords::default();
        let index = SourceIndex::authority(&table, &keywords, DuplicatePolicy::KeepFirst).unwrap();

        assert!(!index.has_status);
        assert!(index.contains("F00001"));
        assert_eq!(index.status("F00001"), None);
    }

    #[test]
    fn missing_mandatory_column() {
        let table = table(&["Serie", "Total"], vec![]);
        let keywords = ColumnKeywords::default();
        let error =
            SourceIndex::authority(&table, &keywords, DuplicatePolicy::KeepFirst).unwrap_err();
        assert!(matches!(
            error,
            ReconcileError::MissingColumn(e) if e.keywords == ["folio"]
        ));
    }

    fn duplicates() -> Table {
        table(
            &["Numero", "Estado pago"],
            vec![
                vec![text("F001"), text("pagado")],
                vec![text("f001"), text("cancelado")],
            ],
        )
    }

    #[test]
    fn duplicates_keep_first() {
        let keywords = ColumnKeywords::default();
        let index =
            SourceIndex::accounting(&duplicates(), &keywords, DuplicatePolicy::KeepFirst).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.status("F001"), Some("pagado"));
    }

    #[test]
    fn duplicates_keep_last() {
        let keywords = ColumnKeywords::default();
        let index =
            SourceIndex::accounting(&duplicates(), &keywords, DuplicatePolicy::KeepLast).unwrap();
        assert_eq!(index.status("F001"), Some("cancelado"));
    }

    #[test]
    fn duplicates_rejected() {
        let keywords = ColumnKeywords::default();
        let error = SourceIndex::accounting(&duplicates(), &keywords, DuplicatePolicy::Reject)
            .unwrap_err();
        insta::assert_snapshot!(error, @"invoice F001 appears 2 times in the Odoo file");
    }
}
