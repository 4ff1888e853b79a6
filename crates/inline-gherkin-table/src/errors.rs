//! Error types surfaced while parsing and projecting inline tables.

use thiserror::Error;

/// Layout expected by the parser, quoted in every parse error.
pub(crate) const EXPECTED_LAYOUT: &str = "| Header1 | Header2 |\n| value1  | value2  |";

/// Errors raised while splitting a step description into a table.
///
/// Parse errors are never retried: they describe a mistake in the step text
/// itself, so every variant carries the raw table text for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TableError {
    /// The table text does not start and end with a pipe, or has no body row.
    #[error("malformed table, expected layout:\n{EXPECTED_LAYOUT}\nbut was:\n{raw}")]
    Malformed {
        /// The offending table text.
        raw: String,
    },
    /// A header cell is blank.
    #[error("table header column {column_index} is empty in:\n{raw}")]
    EmptyHeader {
        /// 1-based index of the blank header cell.
        column_index: usize,
        /// The offending table text.
        raw: String,
    },
    /// A body row declares more or fewer cells than the header.
    #[error("table row {row_number} has {actual} cells but expected {expected} in:\n{raw}")]
    UnevenRow {
        /// 1-based index of the row that failed, including the header.
        row_number: usize,
        /// Number of declared headers.
        expected: usize,
        /// Number of cells present in the offending row.
        actual: usize,
        /// The offending table text.
        raw: String,
    },
}

impl TableError {
    /// Returns the raw table text that triggered the error.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Malformed { raw }
            | Self::EmptyHeader { raw, .. }
            | Self::UnevenRow { raw, .. } => raw,
        }
    }
}

/// Errors raised while projecting string rows onto a record type.
///
/// Mapping errors describe a mismatch between the table and the target type,
/// so they always name the target type and, where known, the failing header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MappingError {
    /// No registered field or setter matches the header.
    #[error("couldn't find any field or setter named '{header}' in {target}")]
    UnmappedHeader {
        /// Header (after overrides) that failed to resolve.
        header: String,
        /// Name of the target record type.
        target: String,
    },
    /// The cell value could not be converted to the field type.
    #[error("cannot convert '{value}' in column '{header}' of {target} to {expected}: {reason}")]
    Coercion {
        /// Header (after overrides) of the failing cell.
        header: String,
        /// Name of the target record type.
        target: String,
        /// The raw cell value.
        value: String,
        /// Name of the expected field type.
        expected: &'static str,
        /// Root cause reported by the coercion.
        reason: String,
    },
    /// The row factory could not build an instance.
    #[error("error instantiating row of type {target}: {reason}")]
    Instantiation {
        /// Name of the target record type.
        target: String,
        /// Reason reported by the factory.
        reason: String,
    },
}
