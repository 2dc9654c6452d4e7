//! Locating columns by fuzzy header names.

use crate::error::{MissingColumnError, Source};
use crate::sheet::Table;

/// Index of the first column whose lower-cased header contains one of the
/// keywords. Keywords are tried in order; an earlier keyword always wins.
pub fn find_column<S: AsRef<str>>(table: &Table, keywords: &[S]) -> Option<usize> {
    keywords.iter().find_map(|keyword| {
        let keyword = keyword.as_ref().to_lowercase();
        table
            .columns
            .iter()
            .position(|column| column.to_lowercase().contains(&keyword))
    })
}

/// Same as [`find_column`], but a missing column is an error.
pub fn require_column<S: AsRef<str>>(
    table: &Table,
    keywords: &[S],
    origin: Source,
) -> Result<usize, MissingColumnError> {
    find_column(table, keywords).ok_or_else(|| MissingColumnError {
        keywords: keywords.iter().map(|k| k.as_ref().to_owned()).collect(),
        origin,
        columns: table.columns.clone(),
    })
}

/// Keyword lists used to find each relevant column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnKeywords {
    /// Invoice number in the accounting export.
    pub number: Vec<String>,
    /// Invoice series in the authority export.
    pub series: Vec<String>,
    /// Invoice folio in the authority export.
    pub folio: Vec<String>,
    /// Optional payment status in the accounting export.
    pub payment_status: Vec<String>,
    /// Optional status in the authority export.
    pub sat_status: Vec<String>,
}

impl Default for ColumnKeywords {
    fn default() -> Self {
        fn owned(keywords: &[&str]) -> Vec<String> {
            keywords.iter().map(|k| (*k).to_owned()).collect()
        }
        ColumnKeywords {
            number: owned(&["numero"]),
            series: owned(&["serie"]),
            folio: owned(&["folio"]),
            payment_status: owned(&["estado pago", "estado en pago"]),
            sat_status: owned(&["estado sat", "estado"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str]) -> Table {
        Table::new("Sheet1", columns.iter().map(|c| (*c).to_owned()).collect())
    }

    #[test]
    fn matches_case_insensitive_substring() {
        let table = table(&["Fecha", "NUMERO DE FACTURA", "Total"]);
        assert_eq!(find_column(&table, &["numero"]), Some(1));
    }

    #[test]
    fn earlier_keyword_wins_over_earlier_column() {
        let table = table(&["Estado", "Estado SAT"]);
        assert_eq!(find_column(&table, &["estado sat", "estado"]), Some(1));
        assert_eq!(find_column(&table, &["estado", "estado sat"]), Some(0));
    }

    #[test]
    fn first_column_wins_for_one_keyword() {
        let table = table(&["Folio Fiscal", "Folio"]);
        assert_eq!(find_column(&table, &["folio"]), Some(0));
    }

    #[test]
    fn optional_column_absent() {
        let table = table(&["Serie", "Folio"]);
        assert_eq!(find_column(&table, &["estado sat", "estado"]), None);
    }

    #[test]
    fn missing_column_lists_what_was_found() {
        let table = table(&["Serie", "Total"]);
        let error = require_column(&table, &["folio"], Source::Authority).unwrap_err();

        assert_eq!(error.keywords, ["folio"]);
        assert_eq!(error.origin, Source::Authority);
        assert_eq!(error.columns, ["Serie", "Total"]);
        insta::assert_snapshot!(error, @r#"
        no column matches any of the keywords ["folio"] in the SAT file.
        Columns found: ["Serie", "Total"]
        "#);
    }
}
