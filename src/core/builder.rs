//! Purpose: Recursive object construction from accessors.
//! Exports: `FromAccessor`.
//! Role: Domain types opt in to "build me from this accessor"; nesting recurses through it.
//! Invariants: Construction is all-or-nothing; a failed nested build fails the whole value.
//! Invariants: No depth limit or cycle detection is imposed here.
use time::OffsetDateTime;

use super::accessor::Accessor;
use super::error::{CoercionError, Target};
use super::value::{DynamicValue, Map};

pub trait FromAccessor: Sized {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self>;

    /// Builds from a raw decoded value by wrapping it in a fresh accessor.
    fn from_value(value: &DynamicValue) -> Option<Self> {
        Self::from_accessor(&Accessor::new(value))
    }

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<'a> Accessor<'a> {
    pub fn build<T: FromAccessor>(&self) -> Option<T> {
        T::from_accessor(self)
    }

    pub fn require_build<T: FromAccessor>(&self) -> Result<T, CoercionError> {
        self.build::<T>()
            .ok_or_else(|| CoercionError::new(Target::Custom(T::type_name())))
    }
}

impl FromAccessor for String {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_string()
    }
}

impl FromAccessor for f64 {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_f64()
    }
}

impl FromAccessor for f32 {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_f32()
    }
}

impl FromAccessor for i64 {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_i64()
    }
}

impl FromAccessor for bool {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_bool()
    }
}

impl FromAccessor for OffsetDateTime {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_date()
    }
}

impl FromAccessor for Map {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_map().cloned()
    }
}

impl FromAccessor for DynamicValue {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.value().cloned()
    }
}

/// Every element must build; one failure discards the whole sequence.
impl<T: FromAccessor> FromAccessor for Vec<T> {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        accessor.as_array()?;
        accessor.elements().map(|item| item.build::<T>()).collect()
    }
}

/// Absent or null builds `Some(None)`; a present value that fails to build is a failure.
impl<T: FromAccessor> FromAccessor for Option<T> {
    fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
        if !accessor.is_present() || accessor.is_null() {
            return Some(None);
        }
        accessor.build::<T>().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::FromAccessor;
    use crate::core::accessor::Accessor;
    use crate::core::error::Target;
    use crate::core::value::DynamicValue;
    use serde_json::json;
    use time::OffsetDateTime;
    use time::macros::datetime;

    #[derive(Debug, PartialEq)]
    struct Author {
        name: String,
        karma: i64,
    }

    impl FromAccessor for Author {
        fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
            Some(Self {
                name: accessor.get("name").build()?,
                karma: accessor.get("karma").build()?,
            })
        }

        fn type_name() -> &'static str {
            "Author"
        }
    }

    #[derive(Debug, PartialEq)]
    struct Post {
        title: String,
        author: Author,
        published: OffsetDateTime,
        tags: Vec<String>,
        editor: Option<Author>,
    }

    impl FromAccessor for Post {
        fn from_accessor(accessor: &Accessor<'_>) -> Option<Self> {
            Some(Self {
                title: accessor.get("title").build()?,
                author: accessor.get("author").build()?,
                published: accessor.get("published").build()?,
                tags: accessor.get("tags").build()?,
                editor: accessor.get("editor").build()?,
            })
        }
    }

    fn post_json() -> serde_json::Value {
        json!({
            "title": "Hello",
            "author": {"name": "ana", "karma": "12"},
            "published": "2016-10-20T08:00:00Z",
            "tags": ["rust", 7],
            "editor": null
        })
    }

    #[test]
    fn builds_nested_objects() {
        let value = DynamicValue::from(post_json());
        let post = Post::from_value(&value).expect("post");
        assert_eq!(post.title, "Hello");
        assert_eq!(
            post.author,
            Author {
                name: "ana".to_string(),
                karma: 12
            }
        );
        assert_eq!(post.published, datetime!(2016-10-20 8:00 UTC));
        assert_eq!(post.tags, vec!["rust".to_string(), "7".to_string()]);
        assert_eq!(post.editor, None);
    }

    #[test]
    fn nested_failure_fails_whole_object() {
        let mut raw = post_json();
        raw["author"]["karma"] = json!("lots");
        let value = DynamicValue::from(raw);
        assert!(Post::from_value(&value).is_none());
    }

    #[test]
    fn optional_field_present_but_invalid_fails() {
        let mut raw = post_json();
        raw["editor"] = json!({"name": "bo"});
        let value = DynamicValue::from(raw);
        assert!(Post::from_value(&value).is_none());

        let mut raw = post_json();
        raw["editor"] = json!({"name": "bo", "karma": 1});
        let value = DynamicValue::from(raw);
        let post = Post::from_value(&value).expect("post");
        assert_eq!(post.editor.map(|editor| editor.name), Some("bo".to_string()));
    }

    #[test]
    fn sequence_builds_all_or_nothing() {
        let good = DynamicValue::from(json!([{"name": "a", "karma": 1}, {"name": "b", "karma": 2}]));
        let authors: Vec<Author> = Accessor::new(&good).build().expect("authors");
        assert_eq!(authors.len(), 2);

        let bad = DynamicValue::from(json!([{"name": "a", "karma": 1}, {"name": "b"}]));
        assert!(Accessor::new(&bad).build::<Vec<Author>>().is_none());

        let not_list = DynamicValue::from(json!({"name": "a", "karma": 1}));
        assert!(Accessor::new(&not_list).build::<Vec<Author>>().is_none());
    }

    #[test]
    fn builder_sees_registered_date_formats() {
        let value = DynamicValue::from(json!({"at": "2016/10/20"}));
        let root = Accessor::new(&value);
        assert!(root.get("at").build::<OffsetDateTime>().is_none());
        let root = root.with_date_format("yyyy/MM/dd");
        assert_eq!(
            root.get("at").build::<OffsetDateTime>(),
            Some(datetime!(2016-10-20 0:00 UTC))
        );
    }

    #[test]
    fn require_build_names_custom_type() {
        let value = DynamicValue::from(json!({"name": "a"}));
        let err = Accessor::new(&value)
            .require_build::<Author>()
            .expect_err("missing karma");
        assert_eq!(err.target(), Target::Custom("Author"));
        assert_eq!(err.message(), "failed to convert value to type Author");
    }
}
