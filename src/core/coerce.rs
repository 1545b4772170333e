//! Purpose: Best-effort coercion of accessor values into primitive targets.
//! Exports: `Native` identity casts plus the `as_*` / `require_*` accessor methods.
//! Role: Single coercion table serving both optional and fail-fast call styles.
//! Invariants: `as_*` never fails; `require_*` is exactly `as_*` plus a typed error on absence.
//! Invariants: String inputs are parsed first; native values are cast without conversion.
//! Invariants: Bool strings use the textual cascade before any native cast.
use time::OffsetDateTime;

use super::accessor::Accessor;
use super::date::DateFormatCascade;
use super::error::{CoercionError, Target};
use super::value::{DynamicValue, Map, Number};

pub fn string_of(value: &DynamicValue) -> Option<String> {
    match value {
        DynamicValue::String(s) => Some(s.clone()),
        DynamicValue::Null => None,
        other => Some(other.canonical_text()),
    }
}

pub fn f64_of(value: &DynamicValue) -> Option<f64> {
    match value {
        DynamicValue::String(s) => s
            .parse::<f64>()
            .ok()
            .filter(|n| !overflowed(s, n.is_infinite())),
        DynamicValue::Number(n) => Some(n.as_f64()),
        _ => None,
    }
}

pub fn f32_of(value: &DynamicValue) -> Option<f32> {
    match value {
        DynamicValue::String(s) => s
            .parse::<f32>()
            .ok()
            .filter(|n| !overflowed(s, n.is_infinite())),
        DynamicValue::Number(n) => {
            let wide = n.as_f64();
            let narrow = wide as f32;
            (narrow.is_finite() || !wide.is_finite()).then_some(narrow)
        }
        _ => None,
    }
}

// Float parsing saturates to infinity; only an explicit `inf` spelling may produce one.
fn overflowed(text: &str, infinite: bool) -> bool {
    infinite && !text.to_ascii_lowercase().contains("inf")
}

pub fn i64_of(value: &DynamicValue) -> Option<i64> {
    match value {
        DynamicValue::String(s) => s.parse::<i64>().ok(),
        DynamicValue::Number(Number::Float(f)) => integral_f64(*f),
        DynamicValue::Number(n) => n.as_i64(),
        _ => None,
    }
}

// Floats cast to Int only when no information is lost.
fn integral_f64(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

pub fn bool_of(value: &DynamicValue) -> Option<bool> {
    if let DynamicValue::String(s) = value {
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("t") {
            return Some(true);
        }
        if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("f") {
            return Some(false);
        }
        match s.parse::<i64>() {
            Ok(n) if n > 0 => return Some(true),
            Ok(0) => return Some(false),
            _ => {}
        }
    }
    value.as_bool()
}

pub fn date_of(value: &DynamicValue, dates: &DateFormatCascade) -> Option<OffsetDateTime> {
    match value {
        DynamicValue::String(s) => dates.parse(s),
        _ => None,
    }
}

/// Identity cast: present only when the value already has this exact shape.
pub trait Native: Sized {
    fn cast(value: &DynamicValue) -> Option<Self>;

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl Native for DynamicValue {
    fn cast(value: &DynamicValue) -> Option<Self> {
        Some(value.clone())
    }

    fn type_name() -> &'static str {
        "DynamicValue"
    }
}

impl Native for () {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.is_null().then_some(())
    }

    fn type_name() -> &'static str {
        "Null"
    }
}

impl Native for bool {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.as_bool()
    }

    fn type_name() -> &'static str {
        "bool"
    }
}

impl Native for String {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn type_name() -> &'static str {
        "String"
    }
}

impl Native for Number {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.as_number()
    }

    fn type_name() -> &'static str {
        "Number"
    }
}

impl Native for i64 {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.as_number()?.as_i64()
    }

    fn type_name() -> &'static str {
        "i64"
    }
}

impl Native for u64 {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.as_number()?.as_u64()
    }

    fn type_name() -> &'static str {
        "u64"
    }
}

impl Native for f64 {
    fn cast(value: &DynamicValue) -> Option<Self> {
        match value.as_number()? {
            Number::Float(f) => Some(f),
            _ => None,
        }
    }

    fn type_name() -> &'static str {
        "f64"
    }
}

impl Native for Vec<DynamicValue> {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.as_array().map(<[DynamicValue]>::to_vec)
    }

    fn type_name() -> &'static str {
        "Array"
    }
}

impl Native for Map {
    fn cast(value: &DynamicValue) -> Option<Self> {
        value.as_map().cloned()
    }

    fn type_name() -> &'static str {
        "Map"
    }
}

impl<'a> Accessor<'a> {
    pub fn as_string(&self) -> Option<String> {
        self.value().and_then(string_of)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value().and_then(f64_of)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value().and_then(i64_of)
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.value().and_then(f32_of)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value().and_then(bool_of)
    }

    pub fn as_date(&self) -> Option<OffsetDateTime> {
        self.value()
            .and_then(|value| date_of(value, self.date_formats()))
    }

    pub fn as_map(&self) -> Option<&'a Map> {
        self.value().and_then(DynamicValue::as_map)
    }

    pub fn cast<T: Native>(&self) -> Option<T> {
        self.value().and_then(T::cast)
    }

    pub fn require_string(&self) -> Result<String, CoercionError> {
        self.as_string()
            .ok_or_else(|| CoercionError::new(Target::String))
    }

    pub fn require_f64(&self) -> Result<f64, CoercionError> {
        self.as_f64()
            .ok_or_else(|| CoercionError::new(Target::Double))
    }

    pub fn require_i64(&self) -> Result<i64, CoercionError> {
        self.as_i64().ok_or_else(|| CoercionError::new(Target::Int))
    }

    pub fn require_f32(&self) -> Result<f32, CoercionError> {
        self.as_f32().ok_or_else(|| CoercionError::new(Target::Float))
    }

    pub fn require_bool(&self) -> Result<bool, CoercionError> {
        self.as_bool().ok_or_else(|| CoercionError::new(Target::Bool))
    }

    pub fn require_date(&self) -> Result<OffsetDateTime, CoercionError> {
        self.as_date().ok_or_else(|| CoercionError::new(Target::Date))
    }

    pub fn require_map(&self) -> Result<&'a Map, CoercionError> {
        self.as_map()
            .ok_or_else(|| CoercionError::new(Target::Dictionary))
    }

    pub fn require_cast<T: Native>(&self) -> Result<T, CoercionError> {
        self.cast::<T>()
            .ok_or_else(|| CoercionError::new(Target::Custom(T::type_name())))
    }
}
