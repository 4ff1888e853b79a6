//! Parsed table containers.

use std::collections::HashMap;

/// A table of rows sharing one ordered header list.
///
/// Rows are either raw [`Row`] values straight from the parser or records
/// produced by a [`TableMapper`](crate::TableMapper).
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::{parse_step, HeaderOverrides};
///
/// let parsed = parse_step("people: |name|age||Ada|36|", &HeaderOverrides::new()).unwrap();
/// let table = parsed.table.unwrap();
/// assert_eq!(table.headers(), ["name", "age"]);
/// assert_eq!(table.row(0).and_then(|row| row.get("age")), Some("36"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<R> {
    headers: Vec<String>,
    rows: Vec<R>,
}

impl<R> Table<R> {
    /// Builds a table from headers and rows.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<R>) -> Self {
        Self { headers, rows }
    }

    /// Returns the declared headers in order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the rows in declaration order.
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Fetches a row by zero-based index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    /// Returns the number of body rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table has no body rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    /// Consumes the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    /// Converts every row, keeping the headers.
    #[must_use]
    pub fn map_rows<T>(&self, convert: impl FnMut(&R) -> T) -> Table<T> {
        Table::new(self.headers.clone(), self.rows.iter().map(convert).collect())
    }

    /// Fallible variant of [`Table::map_rows`].
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `convert`.
    pub fn try_map_rows<T, E>(
        &self,
        mut convert: impl FnMut(&R) -> Result<T, E>,
    ) -> Result<Table<T>, E> {
        let rows = self
            .rows
            .iter()
            .map(&mut convert)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table::new(self.headers.clone(), rows))
    }
}

impl<R> IntoIterator for Table<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One raw table row: cell values keyed by header name.
///
/// Keys are header names after [`HeaderOverrides`](crate::HeaderOverrides)
/// have been applied. Cells keep column order, so renderers can walk a row
/// without consulting the header list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub(crate) fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    /// Looks up a cell by key. With duplicate keys the first column wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(key, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Iterates over the keys in column order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` when the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Copies the row into a `HashMap`. Later duplicate keys overwrite earlier ones.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.cells.iter().cloned().collect()
    }
}
