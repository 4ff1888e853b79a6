//! Behavioural tests for inline table parsing.

use inline_gherkin_table::{HeaderOverrides, Row, Table, TableError, parse_step, strip_table};
use rstest::rstest;

fn table_of(raw: &str) -> Table<Row> {
    match parse_step(raw, &HeaderOverrides::new()) {
        Ok(parsed) => parsed.table.unwrap_or_else(|| panic!("no table in {raw:?}")),
        Err(err) => panic!("parse failed: {err}"),
    }
}

#[rstest]
#[case::one_column("|id||1||2||3|", &["id"], 3)]
#[case::three_columns(
    "Given:\n| a | b | c |\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |",
    &["a", "b", "c"],
    2
)]
#[case::duplicate_headers("|x|x||1|2|", &["x", "x"], 1)]
fn headers_and_row_count_survive_parsing(
    #[case] raw: &str,
    #[case] headers: &[&str],
    #[case] rows: usize,
) {
    let table = table_of(raw);
    assert_eq!(table.headers(), headers);
    assert_eq!(table.len(), rows);
    assert!(table.iter().all(|row| row.len() == headers.len()));
}

#[test]
fn multi_line_and_single_line_forms_agree() {
    let multi = table_of("Some step:\n|Header1|Header2|\n|value1|value2|");
    let single = table_of("Some step: |Header1|Header2||value1|value2|");
    assert_eq!(multi, single);
}

#[test]
fn description_without_table_is_unmodified() {
    let raw = "When the user logs in";
    let Ok(parsed) = parse_step(raw, &HeaderOverrides::new()) else {
        panic!("plain text must parse");
    };
    assert_eq!(parsed.description, raw);
    assert!(parsed.table.is_none());
}

#[test]
fn display_text_keeps_inner_line_breaks() {
    assert_eq!(
        strip_table("Given a\nlong step:   \n| a |\n| 1 |"),
        "Given a\nlong step:"
    );
}

#[rstest]
#[case::short_row("|a|b|c||1|2|")]
#[case::long_row("|a||1|2|")]
#[case::third_row_short("|a|b||1|2||3|")]
fn uneven_rows_quote_the_raw_table(#[case] raw: &str) {
    let Err(err) = parse_step(raw, &HeaderOverrides::new()) else {
        panic!("uneven table must fail");
    };
    assert!(matches!(err, TableError::UnevenRow { .. }));
    assert_eq!(err.raw(), raw);
    assert!(err.to_string().contains(raw));
}

#[test]
fn header_without_body_is_rejected() {
    let Err(err) = parse_step("Step: |a|b|||", &HeaderOverrides::new()) else {
        panic!("headers alone must fail");
    };
    assert!(matches!(
        err,
        TableError::EmptyHeader { .. } | TableError::Malformed { .. } | TableError::UnevenRow { .. }
    ));
}
