//! Behavioural tests for projecting rows onto records.

use inline_gherkin_table::{
    MappingError, ParsedStep, Record, Row, Schema, TableMapper, coerce_enum,
};
use rstest::rstest;

#[derive(Debug, Default, PartialEq)]
struct MyRecord {
    some_int: i32,
    some_boolean: bool,
    some_string: String,
}

impl Record for MyRecord {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("some_int", |r: &mut MyRecord, v: i32| r.some_int = v)
            .field("some_boolean", |r: &mut MyRecord, v: bool| r.some_boolean = v)
            .field("some_string", |r: &mut MyRecord, v: String| r.some_string = v)
    }
}

#[derive(Debug, Default, PartialEq)]
enum Priority {
    #[default]
    Low,
    High,
}

coerce_enum!(Priority { Low, High });

#[derive(Debug, Default, PartialEq)]
struct Scalars {
    tiny: i8,
    short: i16,
    long: i64,
    byte: u8,
    initial: char,
    priority: Priority,
}

impl Record for Scalars {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("tiny", |s: &mut Scalars, v: i8| s.tiny = v)
            .field("short", |s: &mut Scalars, v: i16| s.short = v)
            .field("long", |s: &mut Scalars, v: i64| s.long = v)
            .field("byte", |s: &mut Scalars, v: u8| s.byte = v)
            .field("initial", |s: &mut Scalars, v: char| s.initial = v)
            .field("priority", |s: &mut Scalars, v: Priority| s.priority = v)
    }
}

fn project<T>(mapper: &TableMapper<T>, raw: &str) -> Result<Vec<T>, MappingError> {
    let Ok(ParsedStep {
        table: Some(table), ..
    }) = mapper.parse(raw)
    else {
        panic!("{raw:?} should contain a table");
    };
    mapper.project(&table).map(inline_gherkin_table::Table::into_rows)
}

#[test]
fn headers_land_in_matching_fields() {
    let records = project(
        &TableMapper::<MyRecord>::new(),
        "|SomeInt|SomeBoolean|SomeString||1|true|someString|",
    );
    assert_eq!(
        records,
        Ok(vec![MyRecord {
            some_int: 1,
            some_boolean: true,
            some_string: "someString".into(),
        }])
    );
}

#[test]
fn header_override_redirects_to_field() {
    let mapper = TableMapper::<MyRecord>::new().map_header("my business int expression", "someInt");
    let Ok(records) = project(
        &mapper,
        "|my business int expression|SomeBoolean|SomeString||1|true|someString|",
    ) else {
        panic!("overridden header should map");
    };
    assert_eq!(records.first().map(|r| r.some_int), Some(1));
}

#[test]
fn every_scalar_width_is_supported() {
    let Ok(records) = project(
        &TableMapper::<Scalars>::new(),
        "|tiny|short|long|byte|initial|priority||-8|300|70000|255|z|High|",
    ) else {
        panic!("all scalars should coerce");
    };
    assert_eq!(
        records,
        vec![Scalars {
            tiny: -8,
            short: 300,
            long: 70_000,
            byte: 255,
            initial: 'z',
            priority: Priority::High,
        }]
    );
}

#[rstest]
#[case::unmapped("|colour||red|", "couldn't find any field or setter named 'colour' in MyRecord")]
#[case::bad_bool(
    "|SomeBoolean||maybe|",
    "cannot convert 'maybe' in column 'SomeBoolean' of MyRecord to bool: expected 'true' or 'false'"
)]
fn mapping_failures_name_header_and_target(#[case] raw: &str, #[case] message: &str) {
    let Err(err) = project(&TableMapper::<MyRecord>::new(), raw) else {
        panic!("{raw:?} must not map");
    };
    assert_eq!(err.to_string(), message);
}

#[test]
fn raw_mapper_exposes_string_rows() {
    let Ok(rows) = project(&TableMapper::<Row>::raw(), "|name|age||Ada|36|") else {
        panic!("raw rows cannot fail");
    };
    let map = rows.first().map(Row::to_map).unwrap_or_default();
    assert_eq!(map.get("age").map(String::as_str), Some("36"));
}
