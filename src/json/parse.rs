//! Purpose: Decode raw bytes into `DynamicValue` trees and classify failures.
//! Exports: `from_slice`, `from_str`, `decode`, `ParseFailureCategory`, categorization helpers.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Decoding never panics; malformed input becomes a `Decode` error.
//! Invariants: Hints describe the failure category and caller context, never payload bytes.
use crate::core::error::{Error, ErrorKind};
use crate::core::value::DynamicValue;

pub fn from_slice(input: &[u8]) -> Result<DynamicValue, serde_json::Error> {
    serde_json::from_slice(input)
}

pub fn from_str(input: &str) -> Result<DynamicValue, serde_json::Error> {
    serde_json::from_str(input)
}

/// Decodes `input`, attaching a categorized hint that names `context`.
pub fn decode(input: &[u8], context: &str) -> Result<DynamicValue, Error> {
    from_slice(input).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid json")
            .with_hint(hint_for_error(&err, context))
            .with_source(err)
    })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Utf8,
    NumericRange,
    DepthLimit,
    Io,
    Data,
    Unknown,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Eof => "eof",
            Self::Utf8 => "utf8",
            Self::NumericRange => "numeric-range",
            Self::DepthLimit => "depth-limit",
            Self::Io => "io",
            Self::Data => "data",
            Self::Unknown => "unknown",
        }
    }
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    let by_message = categorize_message(&err.to_string());
    if by_message != ParseFailureCategory::Unknown {
        return by_message;
    }
    match err.classify() {
        serde_json::error::Category::Syntax => ParseFailureCategory::Syntax,
        serde_json::error::Category::Eof => ParseFailureCategory::Eof,
        serde_json::error::Category::Io => ParseFailureCategory::Io,
        serde_json::error::Category::Data => ParseFailureCategory::Data,
    }
}

pub fn categorize_message(message: &str) -> ParseFailureCategory {
    let message = message.to_ascii_lowercase();
    if message.contains("recursion limit") {
        ParseFailureCategory::DepthLimit
    } else if message.contains("number out of range") {
        ParseFailureCategory::NumericRange
    } else if message.contains("unicode") || message.contains("utf-8") || message.contains("utf8")
    {
        ParseFailureCategory::Utf8
    } else {
        ParseFailureCategory::Unknown
    }
}

pub fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    format!(
        "parse category: {}; context: {context}; line {}, column {}",
        categorize_error(err).label(),
        err.line(),
        err.column()
    )
}
