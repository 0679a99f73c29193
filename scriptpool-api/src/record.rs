//! # Result Records
//!
//! A script's output is a sequence of `ResultRecord`s. Each record is an ordered
//! list of named fields; callers pick the fields they care about by name.

use std::fmt;

use crate::value::Value;

/// Field name used for records that wrap a single value.
pub const VALUE_FIELD: &str = "value";

/// One structured output item of a script invocation.
///
/// Field order is the order in which fields were added. Adding a field with
/// a name that already exists replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRecord {
    fields: Vec<(String, Value)>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a single value in a record with one field named [`VALUE_FIELD`].
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self::new().with_field(VALUE_FIELD, value)
    }

    /// Builder form of [`ResultRecord::set`].
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The [`VALUE_FIELD`] of a single-value record.
    pub fn value(&self) -> Option<&Value> {
        self.get(VALUE_FIELD)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Single-value records print as the bare value.
        if self.fields.len() == 1 && self.fields[0].0 == VALUE_FIELD {
            return write!(f, "{}", self.fields[0].1);
        }
        f.write_str("@{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for ResultRecord {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}
