//! Field-specific coercion of raw cell values.

use tracing::debug;

use crate::inference::split_list_value;
use crate::input::DataTable;
use crate::schema::{CanonicalField, FieldValue};

/// Parse a price by keeping only digits and the decimal point.
///
/// `"$1,299.50"` becomes `1299.5`. Anything that still fails to parse
/// (`"1.2.3"`, `"call us"`) is `None`.
pub fn coerce_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Coerce a raw cell into a value for a canonical field.
///
/// Null-like cells and values that cannot be coerced yield `None`; the
/// failure is logged and never propagated.
pub fn coerce_value(field: CanonicalField, raw: &str) -> Option<FieldValue> {
    if DataTable::is_null_value(raw) {
        return None;
    }
    let trimmed = raw.trim();

    match field {
        CanonicalField::Price => match coerce_price(trimmed) {
            Some(price) => Some(FieldValue::Number(price)),
            None => {
                debug!(field = %field, value = trimmed, "could not coerce value, leaving field empty");
                None
            }
        },
        CanonicalField::BulletPoints | CanonicalField::Images => {
            let items = split_list_value(trimmed);
            (!items.is_empty()).then_some(FieldValue::List(items))
        }
        _ => Some(FieldValue::Text(trimmed.to_string())),
    }
}

/// Split generated list text: one item per line, bullet markers removed.
/// Single-line answers fall back to delimiter splitting.
pub fn split_generated_list(raw: &str) -> Vec<String> {
    let lines: Vec<String> = raw
        .lines()
        .map(strip_bullet)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    if lines.len() > 1 {
        lines
    } else {
        split_list_value(raw.trim())
            .iter()
            .map(|item| strip_bullet(item).to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    let without_marker = trimmed.trim_start_matches(['-', '*', '•']);
    let without_number = match without_marker.find(['.', ')']) {
        Some(idx) if idx > 0 && without_marker[..idx].chars().all(|c| c.is_ascii_digit()) => {
            &without_marker[idx + 1..]
        }
        _ => without_marker,
    };
    without_number.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_price() {
        assert_eq!(coerce_price("19.99"), Some(19.99));
        assert_eq!(coerce_price("$1,299.50"), Some(1299.5));
        assert_eq!(coerce_price("USD 5"), Some(5.0));
        assert_eq!(coerce_price("1.2.3"), None);
        assert_eq!(coerce_price("call us"), None);
        assert_eq!(coerce_price(""), None);
    }

    #[test]
    fn test_coerce_list_fields() {
        assert_eq!(
            coerce_value(CanonicalField::BulletPoints, "A;B;C"),
            Some(FieldValue::List(vec!["A".into(), "B".into(), "C".into()]))
        );
        assert_eq!(coerce_value(CanonicalField::Images, " ; ; "), None);
    }

    #[test]
    fn test_null_like_cells_are_none() {
        assert_eq!(coerce_value(CanonicalField::Title, "N/A"), None);
        assert_eq!(
            coerce_value(CanonicalField::Title, "  Widget "),
            Some(FieldValue::Text("Widget".into()))
        );
    }

    #[test]
    fn test_split_generated_list() {
        assert_eq!(
            split_generated_list("- Durable\n* Light\n3. Cheap\n\n"),
            vec!["Durable", "Light", "Cheap"]
        );
        assert_eq!(split_generated_list("A;B;C"), vec!["A", "B", "C"]);
        assert_eq!(split_generated_list("https://x.test/a.jpg"), vec!["https://x.test/a.jpg"]);
    }
}
