//! Ordered field/value maps destined to become one inserted row.

use crate::value::{Value, parse_number};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// An ordered map from column name to scalar value.
///
/// Iteration follows insertion order; inserting an existing key replaces
/// its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    entries: Vec<(String, Value)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Chainable [`AttributeMap::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Coerce numeric text to numbers and drop empty fields, in place.
    ///
    /// Per field:
    /// - text that parses to a non-zero number, or whose trimmed form is
    ///   exactly `"0"`, becomes that number;
    /// - empty text and `Null` are removed;
    /// - numbers equal to zero (or NaN) are removed, other numbers stay;
    /// - any other text is kept verbatim, so `"0.0"`, `" "` and `"5abc"`
    ///   survive as text.
    ///
    /// Not idempotent for zero: text `"0"` becomes `Int(0)`, which a second
    /// pass removes.
    pub fn normalize(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .filter_map(|(key, value)| match normalize_value(value) {
                Some(value) => Some((key, value)),
                None => {
                    tracing::trace!(target: "lightbnb_db::attributes", field = %key, "dropping empty field");
                    None
                }
            })
            .collect();
    }
}

fn normalize_value(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Int(0) => None,
        Value::Int(n) => Some(Value::Int(n)),
        Value::Float(n) if n == 0.0 || n.is_nan() => None,
        Value::Float(n) => Some(Value::Float(n)),
        Value::Text(text) => {
            let parsed = parse_number(&text);
            if (parsed != 0.0 && !parsed.is_nan()) || text.trim() == "0" {
                Some(Value::number(parsed))
            } else if text.is_empty() {
                None
            } else {
                Some(Value::Text(text))
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

struct AttributeMapVisitor;

impl<'de> Visitor<'de> for AttributeMapVisitor {
    type Value = AttributeMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat object of string, number or null fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AttributeMap, A::Error> {
        let mut map = AttributeMap::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// Fields keep document order, unlike a `HashMap` round trip.
impl<'de> Deserialize<'de> for AttributeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeMapVisitor)
    }
}

/// Types that can describe themselves as an ordered list of column values.
pub trait IntoAttributes {
    fn into_attributes(self) -> AttributeMap;
}

impl IntoAttributes for AttributeMap {
    fn into_attributes(self) -> AttributeMap {
        self
    }
}
