//! Purpose: Closed tagged union for decoded document trees.
//! Exports: `DynamicValue`, `Number`, `Key`, `Map`.
//! Role: Immutable input to `Accessor`; produced by serde or converted from `serde_json::Value`.
//! Invariants: Values are never mutated by navigation or coercion.
//! Invariants: Equality and ordering are total (floats compare by bits / `total_cmp`).
//! Invariants: Canonical text of any value is its compact JSON encoding.
//! Invariants: When key texts collide in JSON, the first key in `Key` order keeps its member.
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

pub type Map = BTreeMap<Key, DynamicValue>;

/// Numeric payload; integers keep their sign split so `u64::MAX` survives decoding.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    PosInt(u64),
    NegInt(i64),
    Float(f64),
}

impl Number {
    fn kind_rank(&self) -> u8 {
        match self {
            Self::NegInt(_) => 0,
            Self::PosInt(_) => 1,
            Self::Float(_) => 2,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, Self::Float(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::PosInt(n) => i64::try_from(n).ok(),
            Self::NegInt(n) => Some(n),
            Self::Float(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::PosInt(n) => Some(n),
            Self::NegInt(_) | Self::Float(_) => None,
        }
    }

    /// Widening view; always present.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::PosInt(n) => n as f64,
            Self::NegInt(n) => n as f64,
            Self::Float(n) => n,
        }
    }

    fn to_json(self) -> serde_json::Value {
        match self {
            Self::PosInt(n) => serde_json::Value::from(n),
            Self::NegInt(n) => serde_json::Value::from(n),
            Self::Float(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PosInt(a), Self::PosInt(b)) => a == b,
            (Self::NegInt(a), Self::NegInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::PosInt(a), Self::PosInt(b)) => a.cmp(b),
            (Self::NegInt(a), Self::NegInt(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PosInt(n) => write!(f, "{n}"),
            Self::NegInt(n) => write!(f, "{n}"),
            Self::Float(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::NegInt(value)
        } else {
            Self::PosInt(value as u64)
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self::PosInt(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(value: &serde_json::Number) -> Self {
        if let Some(n) = value.as_u64() {
            Self::PosInt(n)
        } else if let Some(n) = value.as_i64() {
            Self::NegInt(n)
        } else {
            Self::Float(value.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// Mapping key: plain string, numeric, or an arbitrary value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Str(String),
    Int(i64),
    Value(Box<DynamicValue>),
}

impl Key {
    pub fn from_value(value: DynamicValue) -> Self {
        match value {
            DynamicValue::String(s) => Self::Str(s),
            DynamicValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Value(Box::new(DynamicValue::Number(n))),
            },
            other => Self::Value(Box::new(other)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Value(v) => f.write_str(&v.canonical_text()),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<DynamicValue> for Key {
    fn from(value: DynamicValue) -> Self {
        Self::from_value(value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<DynamicValue>),
    Map(Map),
}

impl DynamicValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }

    /// Compact JSON text; non-finite floats render as `null`.
    pub fn canonical_text(&self) -> String {
        self.to_json().to_string()
    }
}

impl From<&DynamicValue> for serde_json::Value {
    fn from(value: &DynamicValue) -> Self {
        match value {
            DynamicValue::Null => serde_json::Value::Null,
            DynamicValue::Bool(b) => serde_json::Value::Bool(*b),
            DynamicValue::Number(n) => n.to_json(),
            DynamicValue::String(s) => serde_json::Value::String(s.clone()),
            DynamicValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            DynamicValue::Map(map) => {
                // `Key` order puts every `Str` before `Int` and `Value`, so a string key
                // keeps its member when a numeric or value key renders to the same text.
                let mut object = serde_json::Map::new();
                for (key, member) in map {
                    let name = key.to_string();
                    if !object.contains_key(&name) {
                        object.insert(name, serde_json::Value::from(member));
                    }
                }
                serde_json::Value::Object(object)
            }
        }
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(Number::from(&n)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (Key::Str(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i32> for DynamicValue {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(i64::from(value)))
    }
}

impl From<u64> for DynamicValue {
    fn from(value: u64) -> Self {
        Self::Number(Number::PosInt(value))
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<Number> for DynamicValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Map> for DynamicValue {
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(value: Vec<T>) -> Self {
        Self::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<K: Into<Key>, V: Into<DynamicValue>> FromIterator<(K, V)> for DynamicValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Value(v) => serializer.serialize_str(&v.canonical_text()),
        }
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(Number::PosInt(n)) => serializer.serialize_u64(*n),
            Self::Number(Number::NegInt(n)) => serializer.serialize_i64(*n),
            Self::Number(Number::Float(n)) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

struct DynamicValueVisitor;

impl<'de> Visitor<'de> for DynamicValueVisitor {
    type Value = DynamicValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a null, boolean, number, string, sequence, or map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DynamicValue, E> {
        Ok(DynamicValue::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DynamicValue, E> {
        Ok(DynamicValue::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DynamicValue, E> {
        Ok(DynamicValue::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DynamicValue, E> {
        Ok(DynamicValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<DynamicValue, E> {
        Ok(DynamicValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<DynamicValue, D::Error> {
        DynamicValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<DynamicValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element::<DynamicValue>()? {
            items.push(item);
        }
        Ok(DynamicValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<DynamicValue, A::Error> {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry::<DynamicValue, DynamicValue>()? {
            map.insert(Key::from_value(key), value);
        }
        Ok(DynamicValue::Map(map))
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DynamicValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{DynamicValue, Key, Map, Number};
    use serde_json::json;

    #[test]
    fn integers_normalize_by_sign() {
        assert_eq!(Number::from(5i64), Number::PosInt(5));
        assert_eq!(Number::from(-5i64), Number::NegInt(-5));
        assert_ne!(Number::from(1i64), Number::from(1.0));
    }

    #[test]
    fn ordering_is_total_across_kinds() {
        let mut values = vec![
            DynamicValue::from("a"),
            DynamicValue::from(f64::NAN),
            DynamicValue::Null,
            DynamicValue::from(-1i64),
            DynamicValue::Bool(true),
        ];
        values.sort();
        assert_eq!(values[0], DynamicValue::Null);
        assert_eq!(values[1], DynamicValue::Bool(true));
        assert_eq!(values[2], DynamicValue::from(-1i64));
        assert_eq!(values[4], DynamicValue::from("a"));
        assert_eq!(DynamicValue::from(f64::NAN), DynamicValue::from(f64::NAN));
    }

    #[test]
    fn converts_from_serde_json() {
        let value = DynamicValue::from(json!({"a": [1, -2, 2.5, "x", null, true]}));
        let items = value
            .as_map()
            .and_then(|map| map.get(&Key::from("a")))
            .and_then(DynamicValue::as_array)
            .expect("array");
        assert_eq!(items[0], DynamicValue::Number(Number::PosInt(1)));
        assert_eq!(items[1], DynamicValue::Number(Number::NegInt(-2)));
        assert_eq!(items[2], DynamicValue::Number(Number::Float(2.5)));
        assert_eq!(items[3], DynamicValue::from("x"));
        assert!(items[4].is_null());
        assert_eq!(items[5], DynamicValue::Bool(true));
    }

    #[test]
    fn deserializes_directly_with_serde() {
        let value: DynamicValue =
            serde_json::from_str(r#"{"n":18446744073709551615,"s":"ok"}"#).expect("decode");
        let map = value.as_map().expect("map");
        assert_eq!(
            map.get(&Key::from("n")),
            Some(&DynamicValue::Number(Number::PosInt(u64::MAX)))
        );
        assert_eq!(map.get(&Key::from("s")), Some(&DynamicValue::from("ok")));
    }

    #[test]
    fn canonical_text_is_compact_json() {
        assert_eq!(DynamicValue::from(42i64).canonical_text(), "42");
        assert_eq!(DynamicValue::from(1.5).canonical_text(), "1.5");
        assert_eq!(DynamicValue::Bool(false).canonical_text(), "false");
        assert_eq!(DynamicValue::from(f64::INFINITY).canonical_text(), "null");
        let nested = DynamicValue::from(json!({"b": [1, 2], "a": "x"}));
        assert_eq!(nested.canonical_text(), r#"{"a":"x","b":[1,2]}"#);
    }

    #[test]
    fn colliding_key_text_keeps_string_member() {
        let mut map = Map::new();
        map.insert(Key::Int(7), DynamicValue::from("int"));
        map.insert(Key::from("7"), DynamicValue::from("str"));
        let value = DynamicValue::Map(map);
        assert_eq!(value.canonical_text(), r#"{"7":"str"}"#);
        assert_eq!(value.as_map().map(|map| map.len()), Some(2));
    }

    #[test]
    fn numeric_and_value_keys_render_as_text() {
        let mut map = Map::new();
        map.insert(Key::Int(7), DynamicValue::from("seven"));
        map.insert(
            Key::from_value(DynamicValue::from(vec![1i64, 2])),
            DynamicValue::Bool(true),
        );
        let value = DynamicValue::Map(map);
        assert_eq!(value.canonical_text(), r#"{"7":"seven","[1,2]":true}"#);
        let encoded = serde_json::to_string(&value).expect("encode");
        assert_eq!(encoded, r#"{"7":"seven","[1,2]":true}"#);
    }

    #[test]
    fn key_from_value_prefers_primitive_variants() {
        assert_eq!(Key::from_value(DynamicValue::from("k")), Key::from("k"));
        assert_eq!(Key::from_value(DynamicValue::from(3i64)), Key::Int(3));
        assert!(matches!(
            Key::from_value(DynamicValue::from(u64::MAX)),
            Key::Value(_)
        ));
    }

    #[test]
    fn collects_pairs_into_map() {
        let value: DynamicValue = vec![("a", 1i64), ("b", 2i64)].into_iter().collect();
        assert_eq!(value.as_map().map(|map| map.len()), Some(2));
    }
}
