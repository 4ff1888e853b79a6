//! Inline Gherkin tables for `inline-gherkin`.
//!
//! A step description may end with a pipe-delimited table. This crate splits
//! the description from the table, parses the table into ordered [`Row`]s and
//! projects those rows onto caller-declared record types through a
//! [`TableMapper`].
//!
//! ```
//! use inline_gherkin_table::{Record, Schema, TableMapper};
//!
//! #[derive(Debug, Default)]
//! struct Stock {
//!     item: String,
//!     count: i32,
//! }
//!
//! impl Record for Stock {
//!     fn schema() -> Schema<Self> {
//!         Schema::new()
//!             .field("item", |s: &mut Stock, v: String| s.item = v)
//!             .field("count", |s: &mut Stock, v: i32| s.count = v)
//!     }
//! }
//!
//! let mapper = TableMapper::<Stock>::new();
//! let parsed = mapper
//!     .parse("Given the shelf holds:\n| item | count |\n| pens | 12 |")
//!     .unwrap();
//! assert_eq!(parsed.description, "Given the shelf holds:");
//! let stock = mapper.project(&parsed.table.unwrap()).unwrap();
//! assert_eq!(stock.row(0).map(|s| s.count), Some(12));
//! ```

mod errors;
mod mapper;
mod parser;
mod table;

pub use errors::{MappingError, TableError};
pub use mapper::{
    Coerce, CoercionError, DefaultFactory, Record, RowFactory, RowSetter, Schema, SchemaSetter,
    TableMapper,
};
pub use parser::{HeaderOverrides, ParsedStep, parse_step, strip_table};
pub use table::{Row, Table};
