//! # State Bag
//!
//! Caller-defined data attached to a submission and handed, unchanged, to that
//! submission's completion or error handler. The pool moves the bag from the
//! submitter to the handler and never looks inside it.
//!
//! Handlers that depend on particular entries read them with the `require*`
//! accessors, which report a [`StateBagError`] instead of panicking. Dealing
//! with that error is the handler's job.

use std::collections::BTreeMap;

use crate::errors::StateBagError;
use crate::value::Value;

/// Opaque name-to-value metadata round-tripped to handlers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateBag {
    entries: BTreeMap<String, Value>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StateBag::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an entry, returning the previous value under that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entry that the handler cannot work without.
    pub fn require(&self, key: &str) -> Result<&Value, StateBagError> {
        self.entries.get(key).ok_or_else(|| StateBagError::Missing { key: key.to_string() })
    }

    pub fn require_i64(&self, key: &str) -> Result<i64, StateBagError> {
        self.require(key)?.as_i64().ok_or_else(|| StateBagError::TypeMismatch {
            key: key.to_string(),
            expected: "int",
        })
    }

    pub fn require_str(&self, key: &str) -> Result<&str, StateBagError> {
        self.require(key)?.as_str().ok_or_else(|| StateBagError::TypeMismatch {
            key: key.to_string(),
            expected: "text",
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StateBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
