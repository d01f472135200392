//! CSV/TSV reading with delimiter detection.

use std::io::BufRead;
use std::path::Path;

use mercator::{MercatorError, RawRow};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

pub type InputResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Read a delimited file into raw rows keyed by header.
pub fn read_rows(path: &Path) -> InputResult<Vec<RawRow>> {
    let contents = std::fs::read(path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    parse_rows(&contents)
}

/// Parse delimited bytes into raw rows.
pub fn parse_rows(bytes: &[u8]) -> InputResult<Vec<RawRow>> {
    let delimiter = detect_delimiter(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(MercatorError::EmptyData("No columns found".to_string()).into());
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(MercatorError::EmptyData("No data rows found".to_string()).into());
    }

    tracing::debug!(
        rows = rows.len(),
        columns = headers.len(),
        delimiter = %(delimiter as char).escape_default(),
        "read input"
    );
    Ok(rows)
}

/// Detect the delimiter from the first few non-blank lines.
///
/// A delimiter seen the same number of times on every line beats one with
/// a higher but inconsistent count.
fn detect_delimiter(bytes: &[u8]) -> InputResult<u8> {
    let lines: Vec<String> = bytes
        .lines()
        .take(10)
        .map_while(Result::ok)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(MercatorError::EmptyData("File is empty".to_string()).into());
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences outside quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_comma_and_tab() {
        assert_eq!(detect_delimiter(b"a,b,c\n1,2,3\n").unwrap(), b',');
        assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3\n").unwrap(), b'\t');
        assert_eq!(detect_delimiter(b"a;b\n\"x;y\";2\n").unwrap(), b';');
    }

    #[test]
    fn test_quoted_delimiters_ignored() {
        assert_eq!(count_delimiter_in_line("\"a,b\",c", b','), 1);
    }

    #[test]
    fn test_parse_rows_keeps_column_order() {
        let rows = parse_rows(b"Product Code,Item Title,Cost\nA1,Widget,19.99\nA2,Gadget,\n").unwrap();
        assert_eq!(rows.len(), 2);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Product Code", "Item Title", "Cost"]);
        assert_eq!(rows[1]["Cost"], "");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let rows = parse_rows(b"sku,title,price\nA1,Widget\n").unwrap();
        assert_eq!(rows[0]["price"], "");
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(parse_rows(b"").is_err());
        assert!(parse_rows(b"sku,title\n").is_err());
    }

    #[test]
    fn test_read_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"sku\ttitle\nA1\tWidget\n").unwrap();
        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows[0]["title"], "Widget");
    }
}
