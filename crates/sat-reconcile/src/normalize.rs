//! Coercion of raw cell values into canonical forms.

use crate::sheet::CellValue;

/// Width every folio is padded to inside an invoice identifier.
pub const FOLIO_WIDTH: usize = 5;

/// Parse a cell as an amount, stripping thousands separators and whitespace.
///
/// Returns `None` for blank cells and text that is not a number.
pub fn parse_numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(number) | CellValue::DateTime(number) => Some(*number),
        CellValue::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse().ok()
        }
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// Like [`parse_numeric`], but anything unparseable counts as zero.
pub fn normalize_numeric(value: &CellValue) -> f64 {
    parse_numeric(value).unwrap_or(0.0)
}

/// Render a folio as a zero-padded decimal of at least [`FOLIO_WIDTH`] digits.
///
/// Numeric folios are truncated to an integer first. Anything else (e.g.
/// alphanumeric folios) is trimmed and zero-filled as is.
pub fn normalize_folio(value: &CellValue) -> String {
    match folio_number(value) {
        Some(number) => zero_fill(&format!("{number:.0}"), FOLIO_WIDTH),
        None => zero_fill(value.to_string().trim(), FOLIO_WIDTH),
    }
}

fn folio_number(value: &CellValue) -> Option<f64> {
    let number = match value {
        CellValue::Number(number) | CellValue::DateTime(number) => *number,
        CellValue::Text(text) => text.trim().parse::<f64>().ok()?,
        CellValue::Empty | CellValue::Bool(_) => return None,
    };
    if !number.is_finite() {
        return None;
    }
    // `-0.7` truncates to zero, which must not render as "-0"
    let truncated = number.trunc();
    Some(if truncated == 0.0 { 0.0 } else { truncated })
}

/// Left-pad with zeros up to `width`, keeping a leading sign in front.
/// Longer input is returned unchanged.
pub fn zero_fill(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_owned();
    }
    let padding = "0".repeat(width - len);
    match text.strip_prefix(['+', '-']) {
        Some(rest) => format!("{}{padding}{rest}", &text[..1]),
        None => format!("{padding}{text}"),
    }
}

/// Canonical form of a status cell: trimmed and lower-cased.
pub fn normalize_status(value: &CellValue) -> String {
    value.to_string().trim().to_lowercase()
}

/// Canonical form of an identifier fragment: trimmed and upper-cased.
pub fn normalize_identifier(text: &str) -> String {
    text.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folio_pads_numbers() {
        assert_eq!(normalize_folio(&CellValue::Number(7.0)), "00007");
        assert_eq!(normalize_folio(&CellValue::Number(7.9)), "00007");
        assert_eq!(normalize_folio(&CellValue::from("42")), "00042");
        assert_eq!(normalize_folio(&CellValue::from(" 42.0 ")), "00042");
        assert_eq!(normalize_folio(&CellValue::Number(-0.5)), "00000");
    }

    #[test]
    fn folio_never_truncates() {
        assert_eq!(normalize_folio(&CellValue::Number(123456.0)), "123456");
        assert_eq!(normalize_folio(&CellValue::from("ABCDEFG")), "ABCDEFG");
    }

    #[test]
    fn folio_fallback_keeps_alphanumeric_content() {
        assert_eq!(normalize_folio(&CellValue::from("A7")), "000A7");
        assert_eq!(normalize_folio(&CellValue::from("  b12 ")), "00b12");
        assert_eq!(normalize_folio(&CellValue::from("inf")), "00inf");
        assert_eq!(normalize_folio(&CellValue::Empty), "00000");
    }

    #[test]
    fn zero_fill_keeps_sign_in_front() {
        assert_eq!(zero_fill("-7", 5), "-0007");
        assert_eq!(zero_fill("+7", 5), "+0007");
        assert_eq!(zero_fill("7", 5), "00007");
        assert_eq!(zero_fill("", 5), "00000");
    }

    #[test]
    fn numeric_strips_separators() {
        assert_eq!(normalize_numeric(&CellValue::from("1,234.50")), 1234.5);
        assert_eq!(normalize_numeric(&CellValue::from(" 1 000 ")), 1000.0);
        assert_eq!(normalize_numeric(&CellValue::Number(3.25)), 3.25);
    }

    #[test]
    fn numeric_defaults_to_zero() {
        assert_eq!(normalize_numeric(&CellValue::Empty), 0.0);
        assert_eq!(normalize_numeric(&CellValue::from("n/a")), 0.0);
        assert_eq!(normalize_numeric(&CellValue::from("   ")), 0.0);
        assert_eq!(parse_numeric(&CellValue::from("n/a")), None);
    }

    #[test]
    fn status_is_trimmed_and_lowercase() {
        assert_eq!(
            normalize_status(&CellValue::from("  Cancelado ")),
            "cancelado"
        );
        assert_eq!(normalize_status(&CellValue::Empty), "");
    }
}
