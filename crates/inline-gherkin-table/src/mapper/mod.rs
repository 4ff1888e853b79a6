//! Projects raw table rows onto caller-declared record types.
//!
//! Projection runs in two stages. A [`RowFactory`] builds an empty instance
//! and a [`RowSetter`] copies each cell into it. Either stage can be replaced
//! independently; plain closures implement both traits.

mod coerce;
mod schema;

use std::any::type_name;
use std::fmt;

pub use coerce::{Coerce, CoercionError};
pub use schema::{Record, Schema};

use crate::errors::{MappingError, TableError};
use crate::parser::{HeaderOverrides, ParsedStep, parse_step};
use crate::table::{Row, Table};

/// Builds a fresh instance for one row.
pub trait RowFactory<T>: Send + Sync {
    /// Creates the instance the setter will populate.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Instantiation`] when no instance can be built.
    fn create(&self, row: &Row) -> Result<T, MappingError>;
}

/// Copies the cells of one row into an instance.
pub trait RowSetter<T>: Send + Sync {
    /// Populates `target` from `row` and returns it.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] when a header has no matching field or a
    /// value cannot be converted.
    fn apply(&self, row: &Row, target: T) -> Result<T, MappingError>;
}

impl<T, F> RowFactory<T> for F
where
    F: Fn(&Row) -> Result<T, MappingError> + Send + Sync,
{
    fn create(&self, row: &Row) -> Result<T, MappingError> {
        self(row)
    }
}

impl<T, F> RowSetter<T> for F
where
    F: Fn(&Row, T) -> Result<T, MappingError> + Send + Sync,
{
    fn apply(&self, row: &Row, target: T) -> Result<T, MappingError> {
        self(row, target)
    }
}

/// Creates instances through [`Default`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl<T: Default> RowFactory<T> for DefaultFactory {
    fn create(&self, _row: &Row) -> Result<T, MappingError> {
        Ok(T::default())
    }
}

/// Assigns every cell through a [`Schema`].
#[derive(Debug)]
pub struct SchemaSetter<T> {
    schema: Schema<T>,
}

impl<T: Record> SchemaSetter<T> {
    /// Builds the setter from [`Record::schema`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: T::schema(),
        }
    }
}

impl<T: Record> Default for SchemaSetter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Schema<T>> for SchemaSetter<T> {
    fn from(schema: Schema<T>) -> Self {
        Self { schema }
    }
}

impl<T> RowSetter<T> for SchemaSetter<T> {
    fn apply(&self, row: &Row, mut target: T) -> Result<T, MappingError> {
        for (header, value) in row.iter() {
            self.schema.assign(&mut target, header, value)?;
        }
        Ok(target)
    }
}

struct CloneRow;

impl RowFactory<Row> for CloneRow {
    fn create(&self, row: &Row) -> Result<Row, MappingError> {
        Ok(row.clone())
    }
}

struct KeepRow;

impl RowSetter<Row> for KeepRow {
    fn apply(&self, _row: &Row, target: Row) -> Result<Row, MappingError> {
        Ok(target)
    }
}

/// Parses inline tables and projects their rows onto `T`.
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::{Record, Schema, TableMapper};
///
/// #[derive(Debug, Default)]
/// struct Account {
///     owner: String,
///     balance: i64,
/// }
///
/// impl Record for Account {
///     fn schema() -> Schema<Self> {
///         Schema::new()
///             .field("owner", |a: &mut Account, v: String| a.owner = v)
///             .field("balance", |a: &mut Account, v: i64| a.balance = v)
///     }
/// }
///
/// let mapper = TableMapper::<Account>::new().map_header("amount", "balance");
/// let parsed = mapper.parse("accounts: |owner|amount||ada|10||bob|-5|").unwrap();
/// let accounts = mapper.project(&parsed.table.unwrap()).unwrap();
/// assert_eq!(accounts.row(1).map(|a| a.balance), Some(-5));
/// ```
pub struct TableMapper<T> {
    target: &'static str,
    factory: Box<dyn RowFactory<T>>,
    setter: Box<dyn RowSetter<T>>,
    overrides: HeaderOverrides,
}

impl<T: Record + Default + 'static> TableMapper<T> {
    /// Uses [`DefaultFactory`] and the record's [`Schema`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(DefaultFactory, SchemaSetter::<T>::new())
    }
}

impl<T: Record + Default + 'static> Default for TableMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl TableMapper<Row> {
    /// Keeps every row as a raw [`Row`].
    #[must_use]
    pub fn raw() -> Self {
        Self::with_parts(CloneRow, KeepRow)
    }
}

impl<T> TableMapper<T> {
    /// Uses a caller-supplied factory and setter.
    #[must_use]
    pub fn with_parts(
        factory: impl RowFactory<T> + 'static,
        setter: impl RowSetter<T> + 'static,
    ) -> Self {
        Self {
            target: type_name::<T>(),
            factory: Box::new(factory),
            setter: Box::new(setter),
            overrides: HeaderOverrides::new(),
        }
    }

    /// Replaces the row factory.
    #[must_use]
    pub fn with_factory(mut self, factory: impl RowFactory<T> + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Replaces the row setter.
    #[must_use]
    pub fn with_setter(mut self, setter: impl RowSetter<T> + 'static) -> Self {
        self.setter = Box::new(setter);
        self
    }

    /// Redirects a table header to a differently named field.
    #[must_use]
    pub fn map_header(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.overrides.insert(source, target);
        self
    }

    /// Returns the header overrides applied while parsing.
    #[must_use]
    pub fn overrides(&self) -> &HeaderOverrides {
        &self.overrides
    }

    /// Parses `raw` with this mapper's header overrides.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] when the inline table is malformed.
    pub fn parse(&self, raw: &str) -> Result<ParsedStep, TableError> {
        parse_step(raw, &self.overrides)
    }

    /// Projects every row of `table` onto `T`.
    ///
    /// # Errors
    ///
    /// Returns the first [`MappingError`] raised by the factory or setter.
    pub fn project(&self, table: &Table<Row>) -> Result<Table<T>, MappingError> {
        let projected = table.try_map_rows(|row| {
            let instance = self.factory.create(row)?;
            self.setter.apply(row, instance)
        })?;
        log::trace!("projected {} rows onto {}", projected.len(), self.target);
        Ok(projected)
    }
}

impl<T> fmt::Debug for TableMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableMapper")
            .field("target", &self.target)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}
