use std::fmt;
use std::sync::Arc;

/// Immutable script text.
///
/// Cheap to clone; the text is shared, so the same script can be submitted
/// many times without copying it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Script {
    text: Arc<str>,
}

impl Script {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: Arc::from(text.into()) }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the text holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Script {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Script {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
