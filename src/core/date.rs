//! Purpose: Ordered date-parsing cascade used by date coercion.
//! Exports: `DateFormat`, `DateStyle`, `DateFormatCascade`, `DateMatch`, `MatchSource`.
//! Role: Custom caller patterns first (registration order), then fixed style buckets.
//! Invariants: Style order is full, long, short, medium, none; first match wins.
//! Invariants: Custom patterns are per-cascade; clones are snapshots, never live views.
//! Invariants: Missing time-of-day parses as midnight, missing offset as UTC.
//! Invariants: Missing date fields default to 2000-01-01; a parsed weekday must agree with the date.
use std::num::NonZeroU8;
use std::sync::{Arc, OnceLock};

use time::format_description::OwnedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::parsing::Parsed;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use super::pattern;

#[derive(Clone, Debug)]
enum Parser {
    Description(Vec<OwnedFormatItem>),
    Rfc3339,
}

/// One compiled date pattern. Invalid patterns are retained but never match.
#[derive(Clone, Debug)]
pub struct DateFormat {
    pattern: String,
    parser: Option<Parser>,
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let parser = match compile(&pattern) {
            Ok(items) => Some(Parser::Description(items)),
            Err(reason) => {
                tracing::warn!(pattern = %pattern, %reason, "date pattern will never match");
                None
            }
        };
        Self { pattern, parser }
    }

    fn rfc3339() -> Self {
        Self {
            pattern: "RFC 3339".to_string(),
            parser: Some(Parser::Rfc3339),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_valid(&self) -> bool {
        self.parser.is_some()
    }

    pub fn parse(&self, input: &str) -> Option<OffsetDateTime> {
        match self.parser.as_ref()? {
            Parser::Rfc3339 => OffsetDateTime::parse(input, &Rfc3339).ok(),
            Parser::Description(alternatives) => alternatives
                .iter()
                .find_map(|items| parse_with_defaults(input, items)),
        }
    }
}

const DEFAULT_YEAR: i32 = 2000;

fn compile(pattern: &str) -> Result<Vec<OwnedFormatItem>, String> {
    pattern::translate(pattern)
        .map_err(|err| err.to_string())?
        .iter()
        .map(|description| {
            time::format_description::parse_owned::<1>(description).map_err(|err| err.to_string())
        })
        .collect()
}

fn parse_with_defaults(input: &str, items: &OwnedFormatItem) -> Option<OffsetDateTime> {
    let mut parsed = Parsed::new();
    let rest = parsed.parse_item(input.as_bytes(), items).ok()?;
    if !rest.is_empty() {
        return None;
    }
    assemble(&parsed)
}

// Fills whatever the pattern did not capture instead of rejecting partial dates.
fn assemble(parsed: &Parsed) -> Option<OffsetDateTime> {
    let date = Date::from_calendar_date(
        parsed.year().unwrap_or(DEFAULT_YEAR),
        parsed.month().unwrap_or(Month::January),
        parsed.day().map_or(1, NonZeroU8::get),
    )
    .ok()?;
    let full_date = parsed.year().is_some() && parsed.month().is_some() && parsed.day().is_some();
    if full_date && parsed.weekday().is_some_and(|weekday| weekday != date.weekday()) {
        return None;
    }

    let hour = match (parsed.hour_24(), parsed.hour_12(), parsed.hour_12_is_pm()) {
        (Some(hour), _, _) => hour,
        (None, Some(hour), Some(true)) => hour.get() % 12 + 12,
        (None, Some(hour), Some(false)) => hour.get() % 12,
        (None, Some(hour), None) => hour.get(),
        (None, None, _) => 0,
    };
    let time = Time::from_hms_nano(
        hour,
        parsed.minute().unwrap_or(0),
        parsed.second().unwrap_or(0),
        parsed.subsecond().unwrap_or(0),
    )
    .ok()?;
    let offset = UtcOffset::from_hms(
        parsed.offset_hour().unwrap_or(0),
        parsed.offset_minute_signed().unwrap_or(0),
        parsed.offset_second_signed().unwrap_or(0),
    )
    .ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_offset(offset))
}

/// Locale-independent style buckets, in cascade order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DateStyle {
    Full,
    Long,
    Short,
    Medium,
    None,
}

impl DateStyle {
    pub const CASCADE: [DateStyle; 5] = [
        DateStyle::Full,
        DateStyle::Long,
        DateStyle::Short,
        DateStyle::Medium,
        DateStyle::None,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DateStyle::Full => "full",
            DateStyle::Long => "long",
            DateStyle::Short => "short",
            DateStyle::Medium => "medium",
            DateStyle::None => "none",
        }
    }

    fn patterns(self) -> &'static [&'static str] {
        match self {
            DateStyle::Full => &[
                "EEEE, MMMM d, yyyy 'at' h:mm:ss a xxxxx",
                "EEEE, MMMM d, yyyy",
            ],
            DateStyle::Long => &["MMMM d, yyyy 'at' h:mm:ss a xxxxx", "MMMM d, yyyy"],
            DateStyle::Short => &["M/d/yyyy, h:mm a", "M/d/yyyy"],
            DateStyle::Medium => &["MMM d, yyyy 'at' h:mm:ss a", "MMM d, yyyy"],
            DateStyle::None => &["yyyy-MM-dd"],
        }
    }

    /// Compiled formats for this bucket; built once, immutable afterwards.
    pub fn formats(self) -> &'static [DateFormat] {
        static BUCKETS: OnceLock<Vec<Vec<DateFormat>>> = OnceLock::new();
        let buckets = BUCKETS.get_or_init(|| {
            DateStyle::CASCADE
                .iter()
                .map(|style| {
                    let mut formats: Vec<DateFormat> =
                        style.patterns().iter().map(|p| DateFormat::new(*p)).collect();
                    if *style == DateStyle::None {
                        formats.insert(0, DateFormat::rfc3339());
                    }
                    formats
                })
                .collect()
        });
        &buckets[self as usize]
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchSource {
    /// Index into the registered custom patterns.
    Custom(usize),
    Style(DateStyle),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DateMatch {
    pub value: OffsetDateTime,
    pub source: MatchSource,
}

#[derive(Clone, Debug, Default)]
pub struct DateFormatCascade {
    custom: Arc<Vec<DateFormat>>,
}

impl DateFormatCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pattern. Clones taken before this call do not see it.
    pub fn register(&mut self, pattern: impl Into<String>) {
        Arc::make_mut(&mut self.custom).push(DateFormat::new(pattern));
    }

    pub fn custom(&self) -> &[DateFormat] {
        &self.custom
    }

    pub fn parse(&self, input: &str) -> Option<OffsetDateTime> {
        self.resolve(input).map(|found| found.value)
    }

    pub fn resolve(&self, input: &str) -> Option<DateMatch> {
        for (idx, format) in self.custom.iter().enumerate() {
            if let Some(value) = format.parse(input) {
                tracing::trace!(pattern = format.pattern(), "custom date pattern matched");
                return Some(DateMatch {
                    value,
                    source: MatchSource::Custom(idx),
                });
            }
        }
        for style in DateStyle::CASCADE {
            if let Some(value) = style.formats().iter().find_map(|format| format.parse(input)) {
                tracing::trace!(style = style.name(), "date style matched");
                return Some(DateMatch {
                    value,
                    source: MatchSource::Style(style),
                });
            }
        }
        None
    }
}
