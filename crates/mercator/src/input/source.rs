//! Raw input rows and a column-oriented view over them.

use indexmap::IndexMap;

/// One input record: source column name to raw value, in column order.
pub type RawRow = IndexMap<String, String>;

/// Represents raw tabular data as a column-aligned table.
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column headers, in first-encounter order.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order), aligned to `headers`.
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Align raw rows into a table.
    ///
    /// Headers are the union of every row's keys in encounter order; a column
    /// absent from a row reads as an empty value.
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let aligned = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| row.get(h).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self::new(headers, aligned)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| {
            row.get(index)
                .map(|s| s.as_str())
                .unwrap_or("")
        })
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_rows_unions_headers() {
        let rows = vec![
            row(&[("sku", "A1"), ("name", "Lamp")]),
            row(&[("sku", "A2"), ("price", "9.50")]),
        ];
        let table = DataTable::from_rows(&rows);

        assert_eq!(table.headers, vec!["sku", "name", "price"]);
        assert_eq!(table.get(0, 2), Some(""));
        assert_eq!(table.get(1, 1), Some(""));
        assert_eq!(table.get(1, 2), Some("9.50"));
    }

    #[test]
    fn test_null_values() {
        assert!(DataTable::is_null_value("  "));
        assert!(DataTable::is_null_value("N/A"));
        assert!(!DataTable::is_null_value("0"));
    }
}
