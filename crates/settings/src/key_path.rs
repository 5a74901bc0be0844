use std::fmt;

/// Dotted settings path, e.g. `"appearance.theme"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn root(key: impl Into<String>) -> Self {
        KeyPath(vec![key.into()])
    }

    pub fn from_dotted(path: &str) -> Self {
        KeyPath(path.split('.').map(str::to_string).collect())
    }

    /// This path extended by one segment.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut parts = self.0.clone();
        parts.push(key.into());
        KeyPath(parts)
    }

    pub fn push(&mut self, part: impl Into<String>) {
        self.0.push(part.into());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
