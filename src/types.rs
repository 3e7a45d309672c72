use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or bound to a named placeholder.
///
/// ```rust
/// use sql_cipher_middleware::prelude::*;
///
/// let params = ParameterSet::from_iter([
///     ("id", RowValues::Int(1)),
///     (":name", RowValues::Text("alice".into())),
/// ]);
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// NULL, empty text, or an empty blob. The cipher never sees these.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            RowValues::Null => true,
            RowValues::Text(s) => s.is_empty(),
            RowValues::Blob(b) => b.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Render scalar values as text. Blobs render only when they hold UTF-8.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            RowValues::Int(i) => Some(i.to_string()),
            RowValues::Float(f) => Some(f.to_string()),
            RowValues::Text(s) => Some(s.clone()),
            RowValues::Bool(b) => Some(if *b { "1".into() } else { "0".into() }),
            RowValues::Timestamp(dt) => Some(dt.format("%F %T%.f").to_string()),
            RowValues::Null => None,
            RowValues::JSON(j) => Some(j.to_string()),
            RowValues::Blob(bytes) => String::from_utf8(bytes.clone()).ok(),
        }
    }
}

/// Prefix marking a bind key as a named placeholder.
pub const NAMED_SIGIL: char = ':';

/// The sigil-prefixed form of a placeholder name.
#[must_use]
pub fn named_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 1);
    key.push(NAMED_SIGIL);
    key.push_str(name);
    key
}

/// Parameters for one execute call, keyed by bind key.
///
/// A key is either the bare placeholder name (`id`) or its sigil-prefixed form (`:id`);
/// lookups by placeholder name consult both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<String, RowValues>,
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `key` exactly as given, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: RowValues) -> Option<RowValues> {
        self.values.insert(key.into(), value)
    }

    /// Value stored under the literal `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RowValues> {
        self.values.get(key)
    }

    /// Look up a placeholder name under either key form, bare first.
    /// Returns the key it was found under along with the value.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<(&str, &RowValues)> {
        if let Some((key, value)) = self.values.get_key_value(name) {
            return Some((key.as_str(), value));
        }
        self.values
            .get_key_value(named_key(name).as_str())
            .map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn contains_named(&self, name: &str) -> bool {
        self.get_named(name).is_some()
    }

    /// Mutable access to the value under the literal `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut RowValues> {
        self.values.get_mut(key)
    }

    /// Remove both key forms of a placeholder name.
    pub fn remove_named(&mut self, name: &str) {
        self.values.remove(name);
        self.values.remove(named_key(name).as_str());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RowValues)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, RowValues)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// How a fetched row is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowShape {
    /// Ordered column names with values, accessed by column.
    Assoc,
    /// Named fields, accessed like an object's members.
    #[default]
    Object,
}

/// Shape of fetched rows, optionally grouped under the first column's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchMode {
    pub shape: RowShape,
    pub grouped: bool,
}

impl FetchMode {
    pub const ASSOC: FetchMode = FetchMode {
        shape: RowShape::Assoc,
        grouped: false,
    };

    pub const OBJECT: FetchMode = FetchMode {
        shape: RowShape::Object,
        grouped: false,
    };

    /// The same shape, grouped by the first column.
    #[must_use]
    pub fn grouped(mut self) -> Self {
        self.grouped = true;
        self
    }
}
