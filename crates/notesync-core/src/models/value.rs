//! Field value model

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// The value of a single tracked field of a note, folder, or settings record.
///
/// Fields may hold text (title, content), lists (tags), or structured objects
/// (settings blocks). Equality is structural and total, so the three-way
/// comparison can rely on `==` for every shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent or explicitly cleared
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value (never NaN)
    Number(Number),
    /// Text value
    Text(String),
    /// Ordered list of values
    List(Vec<FieldValue>),
    /// Keyed object, ordered by key
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Build a list of text values, e.g. a tag list.
    pub fn text_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(|value| Self::Text(value.into())).collect())
    }

    /// Whether this value counts as "no value" for a custom resolution.
    ///
    /// Only `null` and the empty string are empty; an empty list is a
    /// legitimate choice (e.g. clearing all tags).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Borrow the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "(empty)"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::List(_) | Self::Object(_) => {
                let rendered = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
                write!(f, "{rendered}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_plain_json_shapes() {
        let value: FieldValue =
            serde_json::from_str(r#"{"tags": ["rust", "notes"], "pinned": true, "rank": 3}"#)
                .unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("tags".to_string(), FieldValue::text_list(["rust", "notes"]));
        expected.insert("pinned".to_string(), FieldValue::Bool(true));
        expected.insert("rank".to_string(), FieldValue::from(3_i64));
        assert_eq!(value, FieldValue::Object(expected));

        let null: FieldValue = serde_json::from_str("null").unwrap();
        assert_eq!(null, FieldValue::Null);
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&FieldValue::text_list(["a", "b"])).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        assert_eq!(serde_json::to_string(&FieldValue::Null).unwrap(), "null");
    }

    #[test]
    fn emptiness_covers_null_and_empty_text_only() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::text("").is_empty());
        assert!(!FieldValue::text(" ").is_empty());
        assert!(!FieldValue::List(Vec::new()).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
    }

    #[test]
    fn display_matches_resolver_preview() {
        assert_eq!(FieldValue::Null.to_string(), "(empty)");
        assert_eq!(FieldValue::text("Draft").to_string(), "Draft");
        assert_eq!(
            FieldValue::text_list(["x"]).to_string(),
            "[\n  \"x\"\n]"
        );
    }

    #[test]
    fn optional_values_map_to_null() {
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("t")), FieldValue::text("t"));
    }
}
