//! Purpose: Regression coverage for parse-failure category mapping.
//! Exports: Integration tests only.
//! Role: Verify stable category labels used by decode diagnostics.
//! Invariants: Category mapping remains deterministic for representative errors.
//! Invariants: Tests avoid payload leakage; assertions target category/hint text only.

use jsonlens::api::ErrorKind;
use jsonlens::json::parse::{self, ParseFailureCategory};

#[test]
fn category_mapping_handles_syntax_and_eof() {
    let syntax_err = parse::from_str(r#"{"a":}"#).unwrap_err();
    assert_eq!(
        parse::categorize_error(&syntax_err),
        ParseFailureCategory::Syntax
    );

    let eof_err = parse::from_str(r#"{"a":[1,2"#).unwrap_err();
    assert_eq!(parse::categorize_error(&eof_err), ParseFailureCategory::Eof);
}

#[test]
fn category_mapping_handles_numeric_range() {
    let number_err = parse::from_str(r#"{"n":1e400}"#).unwrap_err();
    assert_eq!(
        parse::categorize_error(&number_err),
        ParseFailureCategory::NumericRange
    );
}

#[test]
fn category_mapping_handles_utf8_and_depth() {
    let utf8_bytes = [b'"', 0xff, b'"'];
    let utf8_err = parse::from_slice(&utf8_bytes).unwrap_err();
    assert_eq!(
        parse::categorize_error(&utf8_err),
        ParseFailureCategory::Utf8
    );

    let deep = format!("{}{}", "[".repeat(256), "]".repeat(256));
    let depth_err = parse::from_str(&deep).unwrap_err();
    assert_eq!(
        parse::categorize_error(&depth_err),
        ParseFailureCategory::DepthLimit
    );
}

#[test]
fn hint_contains_category_and_context() {
    let err = parse::from_str(r#"{"n":1e400}"#).unwrap_err();
    let hint = parse::hint_for_error(&err, "test.context");
    assert!(hint.contains("parse category: numeric-range"));
    assert!(hint.contains("context: test.context"));
    assert!(hint.contains("line 1"));
}

#[test]
fn decode_wraps_failures_as_decode_errors() {
    let err = parse::decode(b"[1,", "stdin").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.message(), Some("invalid json"));
    assert!(err.hint().expect("hint").contains("context: stdin"));
}

#[test]
fn unknown_category_fallback_is_stable() {
    assert_eq!(
        parse::categorize_message("opaque parser issue"),
        ParseFailureCategory::Unknown
    );
}
