//! Value definitions
//!
//! In-memory form of a KeyValues document.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single value: a leaf (string or integer) or a nested mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer leaf (written as its decimal text)
    Int(i64),

    /// String leaf
    String(String),

    /// Nested mapping
    Map(KeyValues),
}

impl Value {
    /// Borrow a string leaf
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of a leaf; numeric strings are parsed
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            Value::Map(_) => None,
        }
    }

    /// Borrow a nested mapping
    pub fn as_map(&self) -> Option<&KeyValues> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Take the nested mapping out of this value
    pub fn into_map(self) -> Option<KeyValues> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Text of a leaf as it appears on the wire
    pub fn leaf_text(&self) -> Option<String> {
        match self {
            Value::Int(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Map(_) => None,
        }
    }

    /// Empty string or empty mapping
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Int(_) => false,
            Value::String(s) => s.is_empty(),
            Value::Map(m) => m.is_empty(),
        }
    }

    /// The value as it reads back off the wire (integers become strings)
    pub fn normalized(&self) -> Value {
        match self {
            Value::Int(n) => Value::String(n.to_string()),
            Value::String(s) => Value::String(s.clone()),
            Value::Map(m) => Value::Map(m.normalized()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<KeyValues> for Value {
    fn from(m: KeyValues) -> Self {
        Value::Map(m)
    }
}

/// Insertion-ordered mapping of string keys to values
///
/// Keys are unique: inserting an existing key replaces its value in place,
/// keeping the original position. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct KeyValues {
    entries: Vec<(String, Value)>,
}

impl KeyValues {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert a value, folding it into an existing mapping under the same key
    ///
    /// Two maps merge recursively; in every other case the new value wins.
    pub fn merge(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let incoming = match value {
            Value::Map(incoming) => incoming,
            other => {
                self.insert(key, other);
                return;
            }
        };
        if let Some(Value::Map(existing)) = self.get_mut(&key) {
            for (k, v) in incoming {
                existing.merge(k, v);
            }
            return;
        }
        self.insert(key, Value::Map(incoming));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let idx = self.position(key)?;
        Some(&mut self.entries[idx].1)
    }

    /// Shorthand for a string leaf lookup
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Shorthand for an integer lookup (numeric strings are parsed)
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Shorthand for a nested mapping lookup
    pub fn get_map(&self, key: &str) -> Option<&KeyValues> {
        self.get(key).and_then(Value::as_map)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Copy with every integer leaf replaced by its string form
    pub fn normalized(&self) -> KeyValues {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.normalized()))
            .collect()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl PartialEq for KeyValues {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for KeyValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut kv = KeyValues::new();
        kv.extend(iter);
        kv
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for KeyValues {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for KeyValues {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for KeyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::to_string(self))
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for KeyValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeyValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KeyValuesVisitor)
    }
}

struct KeyValuesVisitor;

impl<'de> Visitor<'de> for KeyValuesVisitor {
    type Value = KeyValues;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of string keys to KeyValues values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<KeyValues, A::Error> {
        let mut kv = KeyValues::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            kv.insert(key, value);
        }
        Ok(kv)
    }
}

/// Build a [`KeyValues`] from `key => value` pairs
///
/// ```
/// let params = kvrpc::params! { "a" => 1, "b" => 178 };
/// assert_eq!(params.get_i64("b"), Some(178));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::keyvalues::KeyValues::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut kv = $crate::keyvalues::KeyValues::new();
        $( kv.insert($key, $value); )+
        kv
    }};
}
