//! Splits a step description into display text and an inline table.
//!
//! Only one dialect is accepted: every row is wrapped in single pipes and
//! adjacent rows meet as `||`. Line breaks are ignored, so both of these are
//! the same table:
//!
//! ```text
//! A step: |a|b||1|2|
//!
//! A step:
//! | a | b |
//! | 1 | 2 |
//! ```
//!
//! The legacy `||Header||` form yields an empty leading header and is
//! rejected with [`TableError::EmptyHeader`].

use std::collections::HashMap;

use crate::errors::TableError;
use crate::table::{Row, Table};

const CELL_DELIMITER: char = '|';
const ROW_DELIMITER: &str = "||";

/// Redirects header names to different row keys before projection.
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::HeaderOverrides;
///
/// let mut overrides = HeaderOverrides::new();
/// overrides.insert("my business int", "someInt");
/// assert_eq!(overrides.resolve("my business int"), "someInt");
/// assert_eq!(overrides.resolve("other"), "other");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOverrides {
    names: HashMap<String, String>,
}

impl HeaderOverrides {
    /// Creates an empty override table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirects `header` to `field`, replacing any earlier redirection.
    pub fn insert(&mut self, header: impl Into<String>, field: impl Into<String>) {
        self.names.insert(header.into(), field.into());
    }

    /// Returns the key a header maps to.
    #[must_use]
    pub fn resolve<'a>(&'a self, header: &'a str) -> &'a str {
        self.names.get(header).map_or(header, String::as_str)
    }

    /// Returns `true` when no overrides are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A step description split into display text and its optional table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStep {
    /// Description with the table text removed.
    pub description: String,
    /// The parsed table, when the description contains one.
    pub table: Option<Table<Row>>,
}

fn table_start(text: &str) -> Option<usize> {
    let start = text.find(CELL_DELIMITER)?;
    text.get(start..)
        .is_some_and(|rest| rest.contains(ROW_DELIMITER))
        .then_some(start)
}

fn without_line_breaks(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Returns the description with any inline table removed.
///
/// Text without a table is returned unchanged.
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::strip_table;
///
/// assert_eq!(strip_table("Some step: |a||1|"), "Some step:");
/// assert_eq!(strip_table("plain | text"), "plain | text");
/// ```
#[must_use]
pub fn strip_table(raw: &str) -> &str {
    let flat = without_line_breaks(raw);
    if table_start(&flat).is_none() {
        return raw;
    }
    raw.split_once(CELL_DELIMITER)
        .map_or(raw, |(description, _)| description.trim_end())
}

/// Parses a step description, extracting the inline table if present.
///
/// # Errors
///
/// Returns [`TableError`] when a table is present but malformed: missing
/// outer pipes, no body row, a blank header, or a row whose cell count
/// differs from the header count.
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::{parse_step, HeaderOverrides};
///
/// let parsed = parse_step("Given numbers:\n| n |\n| 1 |\n| 2 |", &HeaderOverrides::new())
///     .unwrap();
/// assert_eq!(parsed.description, "Given numbers:");
/// assert_eq!(parsed.table.map(|t| t.len()), Some(2));
/// ```
pub fn parse_step(raw: &str, overrides: &HeaderOverrides) -> Result<ParsedStep, TableError> {
    let flat = without_line_breaks(raw);
    let Some(start) = table_start(&flat) else {
        return Ok(ParsedStep {
            description: raw.to_owned(),
            table: None,
        });
    };
    let (_, table_text) = flat.split_at(start);
    let table = parse_table(table_text.trim(), overrides)?;
    Ok(ParsedStep {
        description: strip_table(raw).to_owned(),
        table: Some(table),
    })
}

fn parse_table(text: &str, overrides: &HeaderOverrides) -> Result<Table<Row>, TableError> {
    let malformed = || TableError::Malformed { raw: text.to_owned() };
    let inner = text
        .strip_prefix(CELL_DELIMITER)
        .and_then(|rest| rest.strip_suffix(CELL_DELIMITER))
        .ok_or_else(malformed)?;

    let mut segments = inner.split(ROW_DELIMITER);
    let headers = segments.next().map(split_cells).ok_or_else(malformed)?;
    if let Some(position) = headers.iter().position(String::is_empty) {
        return Err(TableError::EmptyHeader {
            column_index: position + 1,
            raw: text.to_owned(),
        });
    }

    let keys: Vec<String> = headers
        .iter()
        .map(|header| overrides.resolve(header).to_owned())
        .collect();

    let mut rows = Vec::new();
    for (index, segment) in segments.enumerate() {
        let cells = split_cells(segment);
        if cells.len() != headers.len() {
            return Err(TableError::UnevenRow {
                row_number: index + 2,
                expected: headers.len(),
                actual: cells.len(),
                raw: text.to_owned(),
            });
        }
        rows.push(Row::new(keys.iter().cloned().zip(cells).collect()));
    }
    if rows.is_empty() {
        return Err(malformed());
    }

    log::trace!("parsed table with {} columns and {} rows", headers.len(), rows.len());
    Ok(Table::new(headers, rows))
}

fn split_cells(segment: &str) -> Vec<String> {
    segment
        .split(CELL_DELIMITER)
        .map(|cell| cell.trim().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(raw: &str) -> Result<ParsedStep, TableError> {
        parse_step(raw, &HeaderOverrides::new())
    }

    #[rstest]
    #[case("Some step without table")]
    #[case("a | lone pipe")]
    #[case("")]
    fn text_without_row_delimiter_has_no_table(#[case] raw: &str) {
        let Ok(parsed) = parse(raw) else {
            panic!("plain text should parse");
        };
        assert_eq!(parsed.description, raw);
        assert!(parsed.table.is_none());
        assert_eq!(strip_table(raw), raw);
    }

    #[test]
    fn single_line_table_splits_rows() {
        let Ok(parsed) = parse("Data:|Header1|Header2|Header3||value1 |value2 |value3 |") else {
            panic!("table should parse");
        };
        assert_eq!(parsed.description, "Data:");
        let Some(table) = parsed.table else {
            panic!("table expected");
        };
        assert_eq!(table.headers(), ["Header1", "Header2", "Header3"]);
        let Some(row) = table.row(0) else {
            panic!("one row expected");
        };
        assert_eq!(row.get("Header2"), Some("value2"));
    }

    #[test]
    fn blank_cells_are_kept() {
        let Ok(parsed) = parse("|a|b|c||7|false|   |") else {
            panic!("table should parse");
        };
        let cells: Vec<_> = parsed
            .table
            .iter()
            .flat_map(|t| t.rows().iter())
            .flat_map(|row| row.iter().map(|(_, v)| v.to_owned()))
            .collect();
        assert_eq!(cells, ["7", "false", ""]);
    }

    #[test]
    fn overrides_rename_row_keys_but_not_headers() {
        let mut overrides = HeaderOverrides::new();
        overrides.insert("my int", "someInt");
        let Ok(parsed) = parse_step("|my int||23|", &overrides) else {
            panic!("table should parse");
        };
        let Some(table) = parsed.table else {
            panic!("table expected");
        };
        assert_eq!(table.headers(), ["my int"]);
        assert_eq!(table.row(0).and_then(|r| r.get("someInt")), Some("23"));
        assert_eq!(table.row(0).and_then(|r| r.get("my int")), None);
    }

    #[rstest]
    #[case("|a|b||1|", 2, 2, 1)]
    #[case("|a||1|2|", 2, 1, 2)]
    #[case("|a|b||1|2||3|4|5|", 3, 2, 3)]
    fn uneven_rows_are_rejected(
        #[case] raw: &str,
        #[case] row_number: usize,
        #[case] expected: usize,
        #[case] actual: usize,
    ) {
        let Err(err) = parse(raw) else {
            panic!("uneven table must fail");
        };
        assert_eq!(
            err,
            TableError::UnevenRow {
                row_number,
                expected,
                actual,
                raw: raw.to_owned(),
            }
        );
    }

    #[test]
    fn legacy_double_pipe_header_is_rejected() {
        let Err(err) = parse("Step:||Header1|Header2||| v1 | v2 |") else {
            panic!("legacy dialect must fail");
        };
        assert!(matches!(err, TableError::EmptyHeader { column_index: 1, .. }));
    }

    #[test]
    fn trailing_text_after_table_is_malformed() {
        let Err(err) = parse("Step: |a||1| trailing") else {
            panic!("unterminated table must fail");
        };
        assert!(matches!(err, TableError::Malformed { .. }));
    }
}
