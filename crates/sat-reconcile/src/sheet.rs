//! Reading spreadsheet exports into plain tables.

use std::fmt;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::{ReconcileError, Result};

/// A single cell as read from an input workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    /// An Excel date serial, kept apart from plain numbers so a copied
    /// workbook can write it back with a date format.
    DateTime(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) | CellValue::DateTime(_) | CellValue::Bool(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(text) => CellValue::Text(text.clone()),
            Data::Int(int) => CellValue::Number(*int as f64),
            Data::Float(float) => CellValue::Number(*float),
            Data::Bool(bool) => CellValue::Bool(*bool),
            Data::DateTime(datetime) if datetime.is_duration() => {
                CellValue::Number(datetime.as_f64())
            }
            Data::DateTime(datetime) => CellValue::DateTime(datetime.as_f64()),
            Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
            Data::Error(error) => CellValue::Text(error.to_string()),
        }
    }
}

/// Renders the cell the way it reads in a spreadsheet: whole numbers without
/// a fractional part, empty cells as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(number) | CellValue::DateTime(number)
                if number.fract() == 0.0 && number.abs() < 1e15 =>
            {
                write!(f, "{}", *number as i64)
            }
            CellValue::Number(number) | CellValue::DateTime(number) => write!(f, "{number}"),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
        }
    }
}

/// One worksheet: the header row and the data rows below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    /// Column names used for lookups.
    pub columns: Vec<String>,
    /// The header cells as they are written out.
    pub header: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let header = columns
            .iter()
            .map(|name| CellValue::from(name.as_str()))
            .collect();
        Table {
            name: name.into(),
            columns,
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// The cell at `row`/`column`; missing trailing cells read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(EMPTY)
    }

    /// Reconciliation input: the first used row is the header, blank column
    /// names become `Unnamed: N` and fully blank rows are dropped.
    fn from_range(name: &str, range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let header: Vec<CellValue> = rows
            .next()
            .map(|header| header.iter().map(CellValue::from).collect())
            .unwrap_or_default();
        let columns = header
            .iter()
            .enumerate()
            .map(|(index, cell)| match cell {
                value if value.is_empty() => format!("Unnamed: {index}"),
                value => value.to_string().trim().to_owned(),
            })
            .collect();

        let mut table = Table {
            name: name.to_owned(),
            columns,
            header,
            rows: Vec::new(),
        };
        for row in rows {
            let cells: Vec<CellValue> = row.iter().map(CellValue::from).collect();
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            table.push_row(cells);
        }
        table
    }

    /// A cell-for-cell copy of a worksheet anchored at A1. Sheet row 1 is the
    /// header and every cell keeps its position, blank rows included.
    fn from_sheet(name: &str, range: &Range<Data>) -> Self {
        let (height, width) = range
            .end()
            .map(|(row, column)| (row + 1, column + 1))
            .unwrap_or_default();
        let cell = |row: u32, column: u32| {
            range
                .get_value((row, column))
                .map(CellValue::from)
                .unwrap_or_default()
        };

        let header: Vec<CellValue> = (0..width).map(|column| cell(0, column)).collect();
        let columns = header.iter().map(ToString::to_string).collect();
        let rows = (1..height)
            .map(|row| (0..width).map(|column| cell(row, column)).collect())
            .collect();

        Table {
            name: name.to_owned(),
            columns,
            header,
            rows,
        }
    }
}

/// Read the first worksheet of a workbook. The first row is the header.
pub fn read_first_table(path: &Path) -> Result<Table> {
    let mut tables = read_tables_inner(path, true, Table::from_range)?;
    tables.pop().ok_or_else(|| ReconcileError::EmptyWorkbook {
        path: path.to_owned(),
    })
}

/// Read every worksheet of a workbook, in workbook order, keeping each cell
/// where it was.
pub fn read_tables(path: &Path) -> Result<Vec<Table>> {
    let tables = read_tables_inner(path, false, Table::from_sheet)?;
    if tables.is_empty() {
        return Err(ReconcileError::EmptyWorkbook {
            path: path.to_owned(),
        });
    }
    Ok(tables)
}

fn read_tables_inner(
    path: &Path,
    first_only: bool,
    load: fn(&str, &Range<Data>) -> Table,
) -> Result<Vec<Table>> {
    let read_error = |source| ReconcileError::Read {
        path: path.to_owned(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(read_error)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let mut tables = Vec::new();
    for name in &sheet_names {
        let range = workbook.worksheet_range(name).map_err(read_error)?;
        let table = load(name, &range);
        tracing::debug!(
            "read sheet '{}' from {}: {} columns, {} rows",
            name,
            path.display(),
            table.columns.len(),
            table.rows.len()
        );
        tables.push(table);
        if first_only {
            break;
        }
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn display_whole_numbers_without_fraction() {
        assert_eq!(CellValue::Number(7.0).to_string(), "7");
        assert_eq!(CellValue::Number(-12.0).to_string(), "-12");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::from("A001").to_string(), "A001");
    }

    #[test]
    fn blank_text_counts_as_empty() {
        assert!(CellValue::from("   ").is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn cell_out_of_range_is_empty() {
        let mut table = Table::new("Sheet1", vec!["Numero".into(), "Estado".into()]);
        table.push_row(vec![CellValue::from("F001")]);

        assert_eq!(table.cell(0, 0), &CellValue::from("F001"));
        assert_eq!(table.cell(0, 1), &CellValue::Empty);
        assert_eq!(table.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn header_from_range_names_blank_columns() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("Numero".into()));
        range.set_value((0, 2), Data::String(" Estado ".into()));
        range.set_value((1, 0), Data::String("F001".into()));
        range.set_value((1, 2), Data::Float(3.0));

        let table = Table::from_range("Sheet1", &range);

        assert_eq!(table.columns, ["Numero", "Unnamed: 1", "Estado"]);
        // the third row is blank and dropped
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 2), &CellValue::Number(3.0));
    }

    #[test]
    fn sheet_copy_keeps_positions() {
        let mut range = Range::new((0, 1), (3, 2));
        range.set_value((0, 1), Data::String("Fecha".into()));
        range.set_value((0, 2), Data::String("Cargo 16".into()));
        let date = ExcelDateTime::new(45659.0, ExcelDateTimeType::DateTime, false);
        range.set_value((1, 1), Data::DateTime(date));
        range.set_value((3, 1), Data::String("total".into()));
        range.set_value((3, 2), Data::Float(10.0));

        let table = Table::from_sheet("Polizas", &range);

        assert_eq!(table.columns, ["", "Fecha", "Cargo 16"]);
        assert_eq!(table.header[0], CellValue::Empty);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.cell(0, 1), &CellValue::DateTime(45659.0));
        assert!(table.rows[1].iter().all(CellValue::is_empty));
        assert_eq!(table.cell(2, 2), &CellValue::Number(10.0));
    }

    #[test]
    fn durations_are_plain_numbers() {
        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(
            CellValue::from(&Data::DateTime(duration)),
            CellValue::Number(1.5)
        );
        assert_eq!(CellValue::DateTime(45659.0).to_string(), "45659");
    }
}
