//! Purpose: Navigate a `DynamicValue` tree by key, index, or dot-path.
//! Exports: `Accessor`.
//! Role: Typed facade; coercions live in `coerce`, object building in `builder`.
//! Invariants: Navigation never fails; unresolvable steps yield an absent accessor.
//! Invariants: Each step returns a new accessor borrowing the same immutable tree.
//! Invariants: Children snapshot the parent's date formats at derivation time.
use super::date::DateFormatCascade;
use super::value::{DynamicValue, Key};

#[derive(Clone, Debug, Default)]
pub struct Accessor<'a> {
    value: Option<&'a DynamicValue>,
    dates: DateFormatCascade,
}

impl<'a> Accessor<'a> {
    pub fn new(value: &'a DynamicValue) -> Self {
        Self {
            value: Some(value),
            dates: DateFormatCascade::new(),
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_date_formats(mut self, dates: DateFormatCascade) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.dates.register(pattern);
        self
    }

    /// Appends a custom date pattern. Accessors already derived from this one keep
    /// the patterns they were created with.
    pub fn register_date_format(&mut self, pattern: impl Into<String>) {
        self.dates.register(pattern);
    }

    pub fn date_formats(&self) -> &DateFormatCascade {
        &self.dates
    }

    fn derive(&self, value: Option<&'a DynamicValue>) -> Self {
        Self {
            value,
            dates: self.dates.clone(),
        }
    }

    pub fn value(&self) -> Option<&'a DynamicValue> {
        self.value
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// True only for a present JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self.value, Some(DynamicValue::Null))
    }

    pub fn get(&self, key: &str) -> Self {
        let child = self
            .value
            .and_then(DynamicValue::as_map)
            .and_then(|map| map.get(&Key::Str(key.to_string())));
        self.derive(child)
    }

    /// Sequence position, or numeric key of a mapping.
    pub fn index(&self, index: i64) -> Self {
        let child = match self.value {
            Some(DynamicValue::Array(items)) => {
                usize::try_from(index).ok().and_then(|idx| items.get(idx))
            }
            Some(DynamicValue::Map(map)) => map.get(&Key::Int(index)),
            _ => None,
        };
        self.derive(child)
    }

    pub fn get_key(&self, key: &Key) -> Self {
        let child = self
            .value
            .and_then(DynamicValue::as_map)
            .and_then(|map| map.get(key));
        self.derive(child)
    }

    /// Resolves `a.b.c` one segment at a time. Mapping segments are string keys;
    /// sequence segments must be non-negative indexes. Empty segments never resolve.
    pub fn path(&self, keypath: &str) -> Self {
        let mut current = self.value;
        for segment in keypath.split('.') {
            let Some(value) = current else {
                break;
            };
            if segment.is_empty() {
                current = None;
                break;
            }
            current = match value {
                DynamicValue::Map(map) => map.get(&Key::Str(segment.to_string())),
                DynamicValue::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| items.get(idx)),
                _ => None,
            };
        }
        self.derive(current)
    }

    pub fn len(&self) -> Option<usize> {
        match self.value? {
            DynamicValue::Array(items) => Some(items.len()),
            DynamicValue::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_none_or(|len| len == 0)
    }

    pub fn as_array(&self) -> Option<&'a [DynamicValue]> {
        self.value.and_then(DynamicValue::as_array)
    }

    /// Child accessors for each sequence element; empty for non-sequences.
    pub fn elements(&self) -> impl Iterator<Item = Accessor<'a>> + '_ {
        self.as_array()
            .unwrap_or_default()
            .iter()
            .map(|item| self.derive(Some(item)))
    }

    /// Key and child accessor for each mapping member; empty for non-mappings.
    pub fn entries(&self) -> impl Iterator<Item = (&'a Key, Accessor<'a>)> + '_ {
        self.value
            .and_then(DynamicValue::as_map)
            .into_iter()
            .flat_map(|map| map.iter())
            .map(|(key, value)| (key, self.derive(Some(value))))
    }
}

#[cfg(test)]
mod tests {
    use super::Accessor;
    use crate::core::value::{DynamicValue, Key, Map};
    use serde_json::json;

    fn doc() -> DynamicValue {
        DynamicValue::from(json!({
            "a": {"b": {"c": 42}},
            "list": [10, 20, {"name": "third"}],
            "flag": null
        }))
    }

    #[test]
    fn get_resolves_member_or_absent() {
        let value = doc();
        let root = Accessor::new(&value);
        assert!(root.get("a").is_present());
        assert!(!root.get("missing").is_present());
        assert!(!root.get("a").get("b").get("c").get("d").is_present());
        assert!(root.get("flag").is_present());
        assert!(root.get("flag").is_null());
    }

    #[test]
    fn index_reads_sequences_and_numeric_keys() {
        let value = doc();
        let root = Accessor::new(&value);
        let list = root.get("list");
        assert_eq!(list.index(1).value(), Some(&DynamicValue::from(20i64)));
        assert!(!list.index(3).is_present());
        assert!(!list.index(-1).is_present());
        assert!(!root.index(0).is_present());

        let mut map = Map::new();
        map.insert(Key::Int(7), DynamicValue::from("seven"));
        let numeric = DynamicValue::Map(map);
        let accessor = Accessor::new(&numeric);
        assert_eq!(accessor.index(7).value(), Some(&DynamicValue::from("seven")));
        assert!(!accessor.get("7").is_present());
    }

    #[test]
    fn get_key_requires_mapping() {
        let object_key = Key::from_value(DynamicValue::from(vec![1i64, 2]));
        let mut map = Map::new();
        map.insert(object_key.clone(), DynamicValue::Bool(true));
        let value = DynamicValue::Map(map);
        assert!(Accessor::new(&value).get_key(&object_key).is_present());

        let list = DynamicValue::from(vec![true]);
        assert!(!Accessor::new(&list).get_key(&Key::Int(0)).is_present());
    }

    #[test]
    fn path_walks_maps_and_sequences() {
        let value = doc();
        let root = Accessor::new(&value);
        assert_eq!(
            root.path("a.b.c").value(),
            Some(&DynamicValue::from(42i64))
        );
        assert_eq!(
            root.path("list.2.name").value(),
            Some(&DynamicValue::from("third"))
        );
        assert!(!root.path("a.x.c").is_present());
        assert!(!root.path("a..b").is_present());
        assert!(!root.path("list.x").is_present());
        assert!(!root.path("").is_present());
    }

    #[test]
    fn path_tolerates_partial_prefix() {
        let value = doc();
        let root = Accessor::new(&value);
        let partial = root.path("a.b");
        assert_eq!(partial.get("c").value(), root.path("a.b.c").value());
    }

    #[test]
    fn absent_propagates_through_navigation() {
        let root = Accessor::absent();
        assert!(!root.get("a").index(0).path("b.c").is_present());
        assert_eq!(root.len(), None);
        assert!(root.is_empty());
        assert_eq!(root.elements().count(), 0);
    }

    #[test]
    fn elements_and_entries_iterate_children() {
        let value = doc();
        let root = Accessor::new(&value);
        assert_eq!(root.get("list").elements().count(), 3);
        let keys: Vec<String> = root.entries().map(|(key, _)| key.to_string()).collect();
        assert_eq!(keys, vec!["a", "flag", "list"]);
        assert_eq!(root.len(), Some(3));
    }

    #[test]
    fn children_snapshot_date_formats() {
        let value = DynamicValue::from(json!({"when": "2016/10/20"}));
        let mut root = Accessor::new(&value);
        let early = root.get("when");
        root.register_date_format("yyyy/MM/dd");
        let late = root.get("when");
        assert!(early.date_formats().custom().is_empty());
        assert_eq!(late.date_formats().custom().len(), 1);
    }
}
