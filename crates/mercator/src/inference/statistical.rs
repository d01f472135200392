//! Statistical profiling: fill rate and value type inference.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::DataTable;
use crate::schema::ValueType;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[$€£¥]?\s*[-+]?(\d{1,3}(,\d{3})+|\d*)\.\d+$").unwrap()
});

static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[$€£¥]?\s*[-+]?(\d{1,3}(,\d{3})+|\d+)$").unwrap()
});

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(),  // ISO date
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}").unwrap(),  // US date
        Regex::new(r"^\d{2}-\d{2}-\d{4}").unwrap(),  // European date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(),  // Alt ISO
    ]
});

/// Delimiters recognized inside list-valued cells.
pub const LIST_DELIMITERS: [char; 3] = [';', ',', '\n'];

/// The first list delimiter actually observed in a value.
pub fn first_delimiter(value: &str) -> Option<char> {
    value.chars().find(|c| LIST_DELIMITERS.contains(c))
}

/// Split a cell on its first observed delimiter, trimming and dropping empty tokens.
pub fn split_list_value(value: &str) -> Vec<String> {
    let tokens: Vec<&str> = match first_delimiter(value) {
        Some(delimiter) => value.split(delimiter).collect(),
        None => vec![value],
    };
    tokens
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Results from statistical analysis of a column.
#[derive(Debug, Clone)]
pub struct StatisticalAnalysis {
    /// Inferred value type.
    pub value_type: ValueType,
    /// Fraction of non-empty values over the full column.
    pub fill_rate: f64,
    /// Fraction of sampled values that qualified for `value_type`.
    pub type_share: f64,
    /// Number of non-empty values sampled.
    pub sampled: usize,
    /// Distinct example values, first seen first.
    pub examples: Vec<String>,
    /// The sampled non-empty values themselves.
    pub sample: Vec<String>,
}

/// Performs statistical analysis on data columns.
pub struct StatisticalAnalyzer {
    /// Number of non-empty values used for type inference.
    sample_size: usize,
    /// Share of sampled values that must qualify for a type to win.
    type_threshold: f64,
    /// Number of example values kept on the profile.
    example_count: usize,
}

impl StatisticalAnalyzer {
    /// Create a new statistical analyzer with default settings.
    pub fn new() -> Self {
        Self::with_settings(20, 0.8, 5)
    }

    /// Create an analyzer with explicit settings.
    pub fn with_settings(sample_size: usize, type_threshold: f64, example_count: usize) -> Self {
        Self {
            sample_size: sample_size.max(1),
            type_threshold: type_threshold.clamp(0.0, 1.0),
            example_count,
        }
    }

    /// Analyze a full column of raw values.
    pub fn analyze_values(&self, values: &[&str]) -> StatisticalAnalysis {
        let non_empty: Vec<&str> = values
            .iter()
            .copied()
            .filter(|v| !DataTable::is_null_value(v))
            .map(str::trim)
            .collect();

        let fill_rate = if values.is_empty() {
            0.0
        } else {
            non_empty.len() as f64 / values.len() as f64
        };

        let sample: Vec<&str> = non_empty.iter().copied().take(self.sample_size).collect();
        let (value_type, type_share) = self.infer_type(&sample);

        let mut examples: Vec<String> = Vec::new();
        for v in &non_empty {
            if examples.len() >= self.example_count {
                break;
            }
            if !examples.iter().any(|e| e == v) {
                examples.push(v.to_string());
            }
        }

        StatisticalAnalysis {
            value_type,
            fill_rate,
            type_share,
            sampled: sample.len(),
            examples,
            sample: sample.into_iter().map(String::from).collect(),
        }
    }

    /// Infer the value type by precedence.
    ///
    /// The first type for which at least `type_threshold` of the sample
    /// qualifies wins. A mostly-numeric sample containing decimals is
    /// promoted to decimal even when whole numbers dominate it.
    pub fn infer_type(&self, sample: &[&str]) -> (ValueType, f64) {
        if sample.is_empty() {
            return (ValueType::Unknown, 0.0);
        }

        let total = sample.len() as f64;
        let share = |t: ValueType| {
            sample.iter().filter(|v| Self::qualifies(v, t)).count() as f64 / total
        };

        for value_type in ValueType::PRECEDENCE {
            let qualifying = share(value_type);
            if qualifying >= self.type_threshold {
                return (value_type, qualifying);
            }

            if value_type == ValueType::Decimal && qualifying > 0.0 {
                let numeric = sample
                    .iter()
                    .filter(|v| {
                        Self::qualifies(v, ValueType::Decimal)
                            || Self::qualifies(v, ValueType::Integer)
                    })
                    .count() as f64
                    / total;
                if numeric >= self.type_threshold {
                    return (ValueType::Decimal, numeric * 0.95);
                }
            }
        }

        // String accepts every non-empty value, so this is unreachable for
        // non-empty samples.
        (ValueType::String, 1.0)
    }

    /// Whether a single non-empty value qualifies for a type.
    pub fn qualifies(value: &str, value_type: ValueType) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return false;
        }

        match value_type {
            ValueType::Decimal => DECIMAL_PATTERN.is_match(trimmed),
            ValueType::Integer => INTEGER_PATTERN.is_match(trimmed),
            ValueType::Boolean => matches!(
                trimmed.to_lowercase().as_str(),
                "true" | "false" | "yes" | "no"
            ),
            ValueType::DelimitedList => {
                first_delimiter(trimmed).is_some() && split_list_value(trimmed).len() >= 2
            }
            ValueType::Date => DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)),
            ValueType::String => true,
            ValueType::Unknown => false,
        }
    }
}

impl Default for StatisticalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(values: &[&str]) -> StatisticalAnalysis {
        StatisticalAnalyzer::new().analyze_values(values)
    }

    #[test]
    fn test_infer_decimal_type() {
        let result = analyze(&["19.99", "5.00", "$1,299.50", "0.5"]);
        assert_eq!(result.value_type, ValueType::Decimal);
    }

    #[test]
    fn test_whole_numbers_are_integer() {
        let result = analyze(&["1", "2", "3", "100"]);
        assert_eq!(result.value_type, ValueType::Integer);
    }

    #[test]
    fn test_mixed_numbers_promote_to_decimal() {
        let result = analyze(&["20", "19.99", "15", "12"]);
        assert_eq!(result.value_type, ValueType::Decimal);
    }

    #[test]
    fn test_delimited_list() {
        let result = analyze(&["a;b;c", "x, y", "one\ntwo", "p;q"]);
        assert_eq!(result.value_type, ValueType::DelimitedList);
    }

    #[test]
    fn test_dates_and_booleans() {
        assert_eq!(analyze(&["2024-01-15", "2024-02-20"]).value_type, ValueType::Date);
        assert_eq!(analyze(&["yes", "no", "Yes"]).value_type, ValueType::Boolean);
    }

    #[test]
    fn test_empty_column_is_unknown() {
        let result = analyze(&["", "  ", "NA"]);
        assert_eq!(result.value_type, ValueType::Unknown);
        assert_eq!(result.fill_rate, 0.0);
        assert!(result.examples.is_empty());
    }

    #[test]
    fn test_fill_rate_counts_full_column() {
        let result = analyze(&["a", "", "b", ""]);
        assert_eq!(result.fill_rate, 0.5);
        assert_eq!(result.examples, vec!["a", "b"]);
    }

    #[test]
    fn test_split_uses_first_observed_delimiter() {
        assert_eq!(split_list_value("A;B;C"), vec!["A", "B", "C"]);
        assert_eq!(split_list_value("A, B; C"), vec!["A", "B; C"]);
        assert_eq!(split_list_value(";;A;;"), vec!["A"]);
        assert_eq!(split_list_value("single"), vec!["single"]);
    }
}
