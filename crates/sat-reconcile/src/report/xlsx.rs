use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, Worksheet, XlsxError};

use super::{CellStyle, Report, ReportSheet};
use crate::sheet::CellValue;
use crate::{ReconcileError, Result};

impl CellStyle {
    fn to_format(&self) -> Format {
        let mut format = Format::new();
        if self.bold {
            format = format.set_bold();
        }
        if self.centered {
            format = format.set_align(FormatAlign::Center);
        }
        if let Some(color) = self.font_color {
            format = format.set_font_color(Color::RGB(color));
        }
        if let Some(color) = self.background {
            format = format
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(color));
        }
        if let Some(num_format) = self.num_format {
            format = format.set_num_format(num_format);
        }
        format
    }
}

/// Write one cell. Empty cells are only written when they carry a style.
fn write_cell(
    worksheet: &mut Worksheet,
    (row, column): (u32, u16),
    value: &CellValue,
    style: &CellStyle,
) -> Result<(), XlsxError> {
    let format = style.to_format();
    match value {
        CellValue::Empty if style.is_plain() => {}
        CellValue::Empty => {
            worksheet.write_blank(row, column, &format)?;
        }
        CellValue::Text(text) => {
            worksheet.write_string_with_format(row, column, text, &format)?;
        }
        CellValue::Number(number) | CellValue::DateTime(number) => {
            worksheet.write_number_with_format(row, column, *number, &format)?;
        }
        CellValue::Bool(bool) => {
            worksheet.write_boolean_with_format(row, column, *bool, &format)?;
        }
    }
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &ReportSheet) -> Result<(), XlsxError> {
    worksheet.set_name(&sheet.table.name)?;

    let header_style = sheet.header_style();
    for (column, value) in sheet.table.header.iter().enumerate() {
        write_cell(worksheet, (0, column as u16), value, &header_style)?;
    }

    let column_count = sheet.table.columns.len();
    for (row, cells) in sheet.table.rows.iter().enumerate() {
        let sheet_row = row as u32 + 1;
        for column in 0..column_count.max(cells.len()) {
            let style = sheet.cell_style(row, column);
            let value = sheet.table.cell(row, column);
            write_cell(worksheet, (sheet_row, column as u16), value, &style)?;
        }
    }

    for (column, width) in sheet.column_widths().into_iter().enumerate() {
        worksheet.set_column_width(column as u16, width as f64)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    Ok(())
}

fn build_workbook(report: &Report) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet)?;
    }
    workbook.save_to_buffer()
}

/// Fail unless `path` names an `.xlsx` file, the only format reports are
/// written in.
pub fn ensure_xlsx(path: &Path) -> Result<()> {
    let is_xlsx = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        return Err(ReconcileError::UnsupportedOutput {
            path: path.to_owned(),
        });
    }
    Ok(())
}

/// Serialize the report and write it to `path`.
///
/// The file is written next to its destination first and renamed into place,
/// so a failed run never leaves a partial report behind.
pub fn save_report(report: &Report, path: &Path) -> Result<PathBuf> {
    ensure_xlsx(path)?;
    let buffer = build_workbook(report).map_err(|source| ReconcileError::Write {
        path: path.to_owned(),
        source,
    })?;

    let io_error = |source| ReconcileError::Io {
        path: path.to_owned(),
        source,
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{file_name}.partial"));

    let written = fs::write(&staging, &buffer);
    if let Err(error) = written.and_then(|()| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(io_error(error));
    }

    tracing::info!(
        "wrote {} ({} sheet(s), {} bytes)",
        path.display(),
        report.sheets.len(),
        buffer.len()
    );
    Ok(path.to_owned())
}
