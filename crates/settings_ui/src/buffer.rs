use std::collections::HashMap;

use settings::Value;

/// Pending edits for one dialog invocation. Nothing recorded here
/// reaches the settings store until the controller applies or commits;
/// only keys of descriptors actually shown in the dialog are written.
#[derive(Debug, Default)]
pub struct EditBuffer {
    entries: HashMap<String, Value>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `value` for `key`, replacing any earlier edit.
    pub fn record(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
