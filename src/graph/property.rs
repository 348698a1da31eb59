//! Property values and multi-valued property maps
//!
//! A property key carries a [`Cardinality`]: `Single` keys hold exactly one
//! value that later writes replace, `List` keys accumulate values in write
//! order. Mixing the two on one key is rejected until the key is removed.

use super::store::{GraphError, GraphResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Property value type
///
/// Supports:
/// - String
/// - Integer (i64)
/// - Float (f64)
/// - Boolean
/// - List (Vec<PropertyValue>)
///
/// Integers and floats compare by numeric value, so `30` equals `30.0`.
/// `NaN` equals itself so that projected values deduplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<PropertyValue>),
}

/// Exact integer view of a float, if it has one
fn integral_float(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < UPPER {
        Some(f as i64)
    } else {
        None
    }
}

impl PropertyValue {
    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get float value if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get boolean value if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get list value if this is a list
    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::List(_) => "List",
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyValue::String(a), PropertyValue::String(b)) => a == b,
            (PropertyValue::Boolean(a), PropertyValue::Boolean(b)) => a == b,
            (PropertyValue::Integer(a), PropertyValue::Integer(b)) => a == b,
            (PropertyValue::Float(a), PropertyValue::Float(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            (PropertyValue::Integer(i), PropertyValue::Float(f))
            | (PropertyValue::Float(f), PropertyValue::Integer(i)) => {
                integral_float(*f) == Some(*i)
            }
            (PropertyValue::List(a), PropertyValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PropertyValue {}

impl Hash for PropertyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral floats hash like the matching integer to stay consistent with Eq
        match self {
            PropertyValue::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            PropertyValue::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            PropertyValue::Float(f) => match integral_float(*f) {
                Some(i) => {
                    1u8.hash(state);
                    i.hash(state);
                }
                None if f.is_nan() => {
                    2u8.hash(state);
                    f64::NAN.to_bits().hash(state);
                }
                None => {
                    2u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            PropertyValue::Boolean(b) => {
                3u8.hash(state);
                b.hash(state);
            }
            PropertyValue::List(items) => {
                4u8.hash(state);
                items.hash(state);
            }
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::List(items) => {
                write!(f, "[")?;
                for (i, val) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenience conversions
impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<u32> for PropertyValue {
    fn from(i: u32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(items: Vec<T>) -> Self {
        PropertyValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Write policy for a property key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// A later write replaces the stored value
    #[default]
    Single,
    /// Every write appends a value
    List,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::List => write!(f, "list"),
        }
    }
}

/// All values stored under one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    cardinality: Cardinality,
    values: Vec<PropertyValue>,
}

impl PropertyEntry {
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn values(&self) -> &[PropertyValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<PropertyValue> {
        self.values
    }
}

/// Insertion-ordered map from property key to its values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap {
    entries: IndexMap<String, PropertyEntry>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of a single-cardinality write.
    ///
    /// Replaces any existing entry for `key`, whatever its cardinality.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.entries.insert(
            key.into(),
            PropertyEntry {
                cardinality: Cardinality::Single,
                values: vec![value.into()],
            },
        );
        self
    }

    /// Builder form of a list-cardinality entry holding `values` in order.
    ///
    /// Replaces any existing entry for `key`; no values leaves the key absent.
    pub fn with_list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<PropertyValue>,
    {
        let key = key.into();
        let values: Vec<PropertyValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.entries.shift_remove(&key);
        } else {
            self.entries.insert(
                key,
                PropertyEntry {
                    cardinality: Cardinality::List,
                    values,
                },
            );
        }
        self
    }

    /// Write a value under `key` following `cardinality`
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> GraphResult<()> {
        let key = key.into();
        let value = value.into();

        match self.entries.get_mut(&key) {
            Some(entry) if entry.cardinality != cardinality => Err(GraphError::InvalidCardinality {
                key,
                existing: entry.cardinality,
                requested: cardinality,
            }),
            Some(entry) => {
                match cardinality {
                    Cardinality::Single => entry.values = vec![value],
                    Cardinality::List => entry.values.push(value),
                }
                Ok(())
            }
            None => {
                self.entries.insert(
                    key,
                    PropertyEntry {
                        cardinality,
                        values: vec![value],
                    },
                );
                Ok(())
            }
        }
    }

    /// All values under `key` in insertion order; empty if absent
    pub fn values(&self, key: &str) -> &[PropertyValue] {
        self.entries
            .get(key)
            .map(|entry| entry.values.as_slice())
            .unwrap_or(&[])
    }

    /// First value under `key`
    pub fn value(&self, key: &str) -> Option<&PropertyValue> {
        self.values(key).first()
    }

    /// Cardinality the key was written with
    pub fn cardinality(&self, key: &str) -> Option<Cardinality> {
        self.entries.get(key).map(|entry| entry.cardinality)
    }

    /// Remove every value under `key`, resetting its cardinality
    pub fn remove(&mut self, key: &str) -> Option<PropertyEntry> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.values.is_empty())
    }

    /// Is `value` among the values stored under `key`
    pub fn contains_value(&self, key: &str, value: &PropertyValue) -> bool {
        self.values(key).iter().any(|stored| stored == value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First key whose entry no write could have produced: a single entry
    /// without exactly one value, or an empty list
    pub fn malformed_key(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| match entry.cardinality {
                Cardinality::Single => entry.values.len() != 1,
                Cardinality::List => entry.values.is_empty(),
            })
            .map(|(key, _)| key.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyMap
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PropertyMap::new(), |map, (key, value)| map.with(key, value))
    }
}
