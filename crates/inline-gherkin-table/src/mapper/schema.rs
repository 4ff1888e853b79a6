//! Statically registered field setters for record types.

use std::fmt;

use super::coerce::{Coerce, CoercionError};
use crate::errors::MappingError;

type Assign<T> = Box<dyn Fn(&mut T, &str) -> Result<(), CoercionError> + Send + Sync>;

struct Field<T> {
    name: &'static str,
    key: String,
    expected: &'static str,
    assign: Assign<T>,
}

/// The settable fields of a record type.
///
/// Headers are matched against field names after removing whitespace and
/// underscores and ignoring ASCII case, so `Some Int`, `someInt` and
/// `some_int` all select the same field. A leading `set` on the header is
/// also accepted.
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::Schema;
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
/// }
///
/// let schema = Schema::<Point>::new().field("x", |p: &mut Point, v: i32| p.x = v);
/// let mut point = Point::default();
/// schema.assign(&mut point, "X", "7").unwrap();
/// assert_eq!(point.x, 7);
/// ```
pub struct Schema<T> {
    target: &'static str,
    fields: Vec<Field<T>>,
}

/// A record type that can be populated from a table row.
pub trait Record: Sized {
    /// Returns the fields a row may set.
    fn schema() -> Schema<Self>;
}

impl<T> Schema<T> {
    /// Creates an empty schema named after `T`.
    #[must_use]
    pub fn new() -> Self {
        Self::named(short_type_name::<T>())
    }

    /// Creates an empty schema with an explicit target name for errors.
    #[must_use]
    pub fn named(target: &'static str) -> Self {
        Self {
            target,
            fields: Vec::new(),
        }
    }

    /// Registers a field. The first registration wins when two names
    /// normalize to the same key.
    #[must_use]
    pub fn field<V>(mut self, name: &'static str, set: fn(&mut T, V)) -> Self
    where
        T: 'static,
        V: Coerce + 'static,
    {
        self.fields.push(Field {
            name,
            key: normalize(name),
            expected: V::TYPE_NAME,
            assign: Box::new(move |target, raw| {
                set(target, V::coerce(raw)?);
                Ok(())
            }),
        });
        self
    }

    /// Returns the type name used in mapping errors.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Iterates over registered field names in registration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    fn lookup(&self, header: &str) -> Option<&Field<T>> {
        let key = normalize(header);
        let unprefixed = key.strip_prefix("set");
        self.fields
            .iter()
            .find(|field| field.key == key)
            .or_else(|| {
                unprefixed.and_then(|rest| self.fields.iter().find(|field| field.key == rest))
            })
    }

    /// Coerces `value` and stores it in the field selected by `header`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UnmappedHeader`] when no field matches and
    /// [`MappingError::Coercion`] when the value does not convert.
    pub fn assign(&self, target: &mut T, header: &str, value: &str) -> Result<(), MappingError> {
        let field = self
            .lookup(header)
            .ok_or_else(|| MappingError::UnmappedHeader {
                header: header.to_owned(),
                target: self.target.to_owned(),
            })?;
        (field.assign)(target, value).map_err(|err| MappingError::Coercion {
            header: header.to_owned(),
            target: self.target.to_owned(),
            value: value.to_owned(),
            expected: field.expected,
            reason: err.reason().to_owned(),
        })
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("target", &self.target)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
