//! Named parameters bound to a script before it runs.

use crate::errors::ScriptError;
use crate::value::Value;

/// Ordered, uniquely named script inputs.
///
/// Order is preserved so engines that bind positionally see parameters in the
/// order the caller added them. Names are case-sensitive and must be unique
/// within one set; a duplicate is rejected with
/// [`ScriptError::DuplicateParameter`] at the point it is added, never later.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, rejecting a name that is already bound.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), ScriptError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ScriptError::invalid("parameter name must not be empty"));
        }
        if self.contains(&name) {
            return Err(ScriptError::DuplicateParameter(name));
        }
        self.entries.push((name, value.into()));
        Ok(())
    }

    /// Builder form of [`Parameters::add`].
    ///
    /// ```rust
    /// use scriptpool_api::Parameters;
    ///
    /// let params = Parameters::new().with("i", 1).unwrap().with("ms", 250).unwrap();
    /// assert_eq!(params.len(), 2);
    /// assert!(Parameters::new().with("i", 1).unwrap().with("i", 2).is_err());
    /// ```
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self, ScriptError> {
        self.add(name, value)?;
        Ok(self)
    }

    /// Build a parameter set from pairs, failing on the first duplicate name.
    pub fn try_from_pairs<I, N, V>(pairs: I) -> Result<Self, ScriptError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.add(name, value)?;
        }
        Ok(params)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
