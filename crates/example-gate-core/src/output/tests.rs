// crates/example-gate-core/src/output/tests.rs
// ============================================================================
// Module: Output Parser Tests
// Description: Unit and property coverage for line-delimited JSON decoding.
// Purpose: Ensure records are decoded in order and bad lines fail closed.
// Dependencies: example-gate-core, proptest
// ============================================================================

//! ## Overview
//! Unit cases plus proptest properties for [`super::parse_json_lines`].

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

use super::MAX_ERROR_EXCERPT_CHARS;
use super::parse_json_lines;

#[test]
fn decodes_each_line_in_order() {
    let records = parse_json_lines("{\"a\":1}\n{\"b\":2}\n").unwrap();
    assert_eq!(records, vec![json!({"a": 1}), json!({"b": 2})]);
}

#[test]
fn handles_crlf_and_trailing_blank_lines() {
    let records = parse_json_lines("{\"a\":1}\r\n[1,2]\r\n\r\n  \n").unwrap();
    assert_eq!(records, vec![json!({"a": 1}), json!([1, 2])]);
}

#[test]
fn empty_output_yields_no_records() {
    assert!(parse_json_lines("").unwrap().is_empty());
    assert!(parse_json_lines("\n").unwrap().is_empty());
}

#[test]
fn malformed_line_reports_line_number() {
    let err = parse_json_lines("{\"a\":1}\n{ result: 'success' }\n{\"b\":2}\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.excerpt, "{ result: 'success' }");
    assert!(err.to_string().contains("output line 2"));
}

#[test]
fn interior_blank_line_is_rejected() {
    let err = parse_json_lines("{\"a\":1}\n\n{\"b\":2}\n").unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn long_lines_are_truncated_in_errors() {
    let line = "x".repeat(MAX_ERROR_EXCERPT_CHARS * 2);
    let err = parse_json_lines(&line).unwrap_err();
    assert_eq!(err.excerpt.chars().count(), MAX_ERROR_EXCERPT_CHARS + 3);
    assert!(err.excerpt.ends_with("..."));
}

fn record_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,12}".prop_map(Value::from),
        ("[a-z]{1,8}", any::<u32>()).prop_map(|(key, value)| {
            let mut object = serde_json::Map::new();
            object.insert(key, Value::from(value));
            Value::Object(object)
        }),
    ]
}

proptest! {
    #[test]
    fn k_lines_yield_k_records_in_order(records in prop::collection::vec(record_strategy(), 0..32)) {
        let mut text = String::new();
        for record in &records {
            text.push_str(&serde_json::to_string(record).expect("serialize"));
            text.push('\n');
        }
        let parsed = parse_json_lines(&text).expect("parse");
        prop_assert_eq!(parsed, records);
    }

    #[test]
    fn first_bad_line_stops_parsing(prefix in 0usize..8, suffix in 0usize..8) {
        let mut lines: Vec<String> = (0..prefix).map(|i| format!("{{\"i\":{i}}}")).collect();
        lines.push("not json".to_string());
        lines.extend((0..suffix).map(|_| "also not json {".to_string()));
        let err = parse_json_lines(&lines.join("\n")).expect_err("must fail");
        prop_assert_eq!(err.line, prefix + 1);
        prop_assert_eq!(err.excerpt.as_str(), "not json");
    }
}
