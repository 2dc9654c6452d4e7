//! The comparison report: an in-memory workbook plus the styling rules applied
//! when it is written out.

mod xlsx;

pub use xlsx::{ensure_xlsx, save_report};

use crate::normalize::parse_numeric;
use crate::reconcile::{CancellationStatus, ComparisonRecord, ComparisonStatus};
use crate::sheet::{CellValue, Table};

/// Columns of the comparison report, in order.
pub const REPORT_COLUMNS: [&str; 6] = [
    "FACTURA ODOO",
    "FACTURA SAT",
    "ESTADO DE COMPARACION",
    "ESTADO EN PAGO",
    "ESTADO SAT",
    "ESTADO CANCELADO",
];

pub const REPORT_SHEET_NAME: &str = "Sheet1";

/// Headers whose columns hold amounts.
pub const DEFAULT_MONEY_COLUMNS: [&str; 4] = ["Cargo 16", "Abono 16", "Cargo 8", "Abono 8"];

pub const MONEY_FORMAT: &str = "#,##0.00";
pub const DATE_FORMAT: &str = "yyyy-mm-dd";
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

const HEADER_BLUE: u32 = 0x2980B9;
const WHITE: u32 = 0xFFFFFF;
/// Extra characters added to the widest value of a column.
const WIDTH_MARGIN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub money_columns: Vec<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            money_columns: DEFAULT_MONEY_COLUMNS.map(ToOwned::to_owned).to_vec(),
        }
    }
}

/// Background of a whole data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFill {
    PaleRed,
    PaleGreen,
}

impl RowFill {
    pub fn rgb(self) -> u32 {
        match self {
            RowFill::PaleRed => 0xFFD6D6,
            RowFill::PaleGreen => 0xD6FFD6,
        }
    }

    /// Row color of a comparison record. The first matching rule wins.
    pub fn for_record(record: &ComparisonRecord) -> Option<RowFill> {
        if record.cancellation == CancellationStatus::Mismatch {
            Some(RowFill::PaleRed)
        } else if record.cancellation == CancellationStatus::Agreed
            || record.status == ComparisonStatus::Match
        {
            Some(RowFill::PaleGreen)
        } else if record.status == ComparisonStatus::MissingInAuthority {
            Some(RowFill::PaleRed)
        } else {
            None
        }
    }
}

/// Everything the writer needs to know to format one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub centered: bool,
    pub font_color: Option<u32>,
    pub background: Option<u32>,
    pub num_format: Option<&'static str>,
}

impl CellStyle {
    pub fn is_plain(&self) -> bool {
        *self == CellStyle::default()
    }
}

/// One worksheet of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub table: Table,
    /// One entry per data row.
    pub fills: Vec<Option<RowFill>>,
    money_columns: Vec<usize>,
}

impl ReportSheet {
    pub fn new(table: Table, options: &ReportOptions) -> Self {
        let fills = vec![None; table.rows.len()];
        let money_columns = options
            .money_columns
            .iter()
            .filter_map(|name| table.columns.iter().position(|column| column == name))
            .collect();
        ReportSheet {
            table,
            fills,
            money_columns,
        }
    }

    pub fn is_money_column(&self, column: usize) -> bool {
        self.money_columns.contains(&column)
    }

    /// Write amounts that were exported as text as numbers, so the number
    /// format applies to them.
    fn coerce_money_cells(&mut self) {
        for row in &mut self.table.rows {
            for &column in &self.money_columns {
                let Some(cell) = row.get_mut(column) else {
                    continue;
                };
                if matches!(cell, CellValue::Text(_))
                    && let Some(amount) = parse_numeric(cell)
                {
                    *cell = CellValue::Number(amount);
                }
            }
        }
    }

    /// Column widths in characters: the longest rendered value, header
    /// included, plus a margin.
    pub fn column_widths(&self) -> Vec<usize> {
        (0..self.table.columns.len())
            .map(|column| {
                let header = self.table.header.get(column).map_or(0, display_width);
                let longest = (0..self.table.rows.len())
                    .map(|row| self.table.cell(row, column))
                    .filter(|cell| !cell.is_empty())
                    .map(display_width)
                    .fold(header, usize::max);
                longest + WIDTH_MARGIN
            })
            .collect()
    }

    pub fn header_style(&self) -> CellStyle {
        CellStyle {
            bold: true,
            centered: true,
            font_color: Some(WHITE),
            background: Some(HEADER_BLUE),
            num_format: None,
        }
    }

    /// Style of a data cell; `row` counts from the first row below the header.
    pub fn cell_style(&self, row: usize, column: usize) -> CellStyle {
        let mut style = CellStyle {
            background: self.fills.get(row).copied().flatten().map(RowFill::rgb),
            ..CellStyle::default()
        };
        if let CellValue::DateTime(serial) = self.table.cell(row, column) {
            style.num_format = Some(date_format(*serial));
        }
        if self.is_money_column(column) {
            style.num_format = Some(MONEY_FORMAT);
            if let CellValue::Number(amount) = self.table.cell(row, column)
                && *amount == 0.0
            {
                // zero amounts are hidden against the light background
                style.font_color = Some(WHITE);
            }
        }
        style
    }
}

/// An in-memory workbook, written out once by [`save_report`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub sheets: Vec<ReportSheet>,
}

impl Report {
    /// The comparison report: one row per record, colored by status.
    pub fn comparison(records: &[ComparisonRecord], options: &ReportOptions) -> Self {
        let columns = REPORT_COLUMNS.map(ToOwned::to_owned).to_vec();
        let mut table = Table::new(REPORT_SHEET_NAME, columns);
        for record in records {
            table.push_row(comparison_row(record));
        }

        let mut sheet = ReportSheet::new(table, options);
        sheet.fills = records.iter().map(RowFill::for_record).collect();
        Report {
            sheets: vec![sheet],
        }
    }

    /// A copy of existing worksheets with the generic formatting applied.
    pub fn from_tables(tables: Vec<Table>, options: &ReportOptions) -> Self {
        let sheets = tables
            .into_iter()
            .map(|table| {
                let mut sheet = ReportSheet::new(table, options);
                sheet.coerce_money_cells();
                sheet
            })
            .collect();
        Report { sheets }
    }
}

fn date_format(serial: f64) -> &'static str {
    if serial.fract() == 0.0 {
        DATE_FORMAT
    } else {
        DATETIME_FORMAT
    }
}

/// Characters a cell takes up once rendered; dates render through their
/// number format.
fn display_width(cell: &CellValue) -> usize {
    match cell {
        CellValue::DateTime(serial) => date_format(*serial).len(),
        cell => cell.to_string().chars().count(),
    }
}

fn comparison_row(record: &ComparisonRecord) -> Vec<CellValue> {
    let text = |value: Option<&str>| match value {
        Some(value) if !value.is_empty() => CellValue::from(value),
        _ => CellValue::Empty,
    };
    vec![
        text(record.accounting_id.as_deref()),
        text(record.authority_id.as_deref()),
        text(Some(record.status.label())),
        text(record.payment_status.as_deref()),
        text(record.sat_status.as_deref()),
        text(Some(record.cancellation.label())),
    ]
}
