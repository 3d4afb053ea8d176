//! Typed provenance tags attached to location parts.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::Error;

/// Set of source labels covering a union region.
pub const SOURCE: &str = "source";
/// Set of `{label}_{index}` identifiers of the input parts covering a union region.
pub const SOURCE_PART: &str = "source_part";
/// Whether a union region belongs to a splicing event.
pub const IS_SPLICING: &str = "is_splicing";
/// Event counter of the pass running in strand order.
pub const EVENT_ID_FORWARD: &str = "event_id_forward";
/// Event counter of the pass running against strand order.
pub const EVENT_ID_BACKWARD: &str = "event_id_backward";
/// Composite event identifier, `forward + 100 * backward`.
pub const EVENT_ID: &str = "event_id";

/// Value stored under a tag key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Set(BTreeSet<String>),
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Str(value)
    }
}

impl From<BTreeSet<String>> for TagValue {
    fn from(value: BTreeSet<String>) -> Self {
        TagValue::Set(value)
    }
}

/// Insertion-ordered tag map of a location part.
///
/// Equality ignores insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tags(IndexMap<String, TagValue>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<TagValue>
    where
        K: Into<String>,
        V: Into<TagValue>,
    {
        self.0.insert(key.into(), value.into())
    }

    /// Copy all entries of `other` into `self`, overriding values of equal keys.
    pub fn merge_from(&mut self, other: &Tags) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, Error> {
        match self.lookup(key)? {
            TagValue::Bool(value) => Ok(*value),
            _ => Err(Error::UnexpectedTagType(key.to_string(), "bool")),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64, Error> {
        match self.lookup(key)? {
            TagValue::Int(value) => Ok(*value),
            _ => Err(Error::UnexpectedTagType(key.to_string(), "int")),
        }
    }

    pub fn get_set(&self, key: &str) -> Result<&BTreeSet<String>, Error> {
        match self.lookup(key)? {
            TagValue::Set(value) => Ok(value),
            _ => Err(Error::UnexpectedTagType(key.to_string(), "set")),
        }
    }

    fn lookup(&self, key: &str) -> Result<&TagValue, Error> {
        self.0
            .get(key)
            .ok_or_else(|| Error::MissingTag(key.to_string()))
    }
}

impl std::ops::Deref for Tags {
    type Target = IndexMap<String, TagValue>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> FromIterator<(K, V)> for Tags
where
    K: Into<String>,
    V: Into<TagValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Build a `TagValue::Set` from string-like items.
pub fn tag_set<I, S>(items: I) -> TagValue
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    TagValue::Set(items.into_iter().map(Into::into).collect())
}
