use serde::{Deserialize, Serialize};

use crate::value::{Constraint, Value, ValueKind};

/// Declarative definition of one configurable option.
///
/// A descriptor is either an *item* carrying a default value and an
/// optional constraint, or a *group* carrying ordered child
/// descriptors. The payload split keeps the invariant structural:
/// groups hold no scalar value, items hold no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    key: String,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    read_only: bool,
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Payload {
    Item {
        default: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraint: Option<Constraint>,
    },
    Group {
        children: Vec<Descriptor>,
    },
}

impl Descriptor {
    /// An editable leaf with `default` as its initial value.
    pub fn item(key: impl Into<String>, default: Value) -> Self {
        let key = key.into();
        let label = derive_label(&key);
        Descriptor {
            key,
            label,
            tooltip: None,
            hidden: false,
            read_only: false,
            payload: Payload::Item {
                default,
                constraint: None,
            },
        }
    }

    /// A nested group of child descriptors.
    pub fn group(key: impl Into<String>, children: Vec<Descriptor>) -> Self {
        let key = key.into();
        let label = derive_label(&key);
        Descriptor {
            key,
            label,
            tooltip: None,
            hidden: false,
            read_only: false,
            payload: Payload::Group { children },
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Attaches a validator. No effect on groups.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        if let Payload::Item {
            constraint: slot, ..
        } = &mut self.payload
        {
            *slot = Some(constraint);
        }
        self
    }

    /// Excludes this descriptor (and its subtree) from generated dialogs.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Shown but not editable.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn kind(&self) -> ValueKind {
        match &self.payload {
            Payload::Item { default, .. } => default.kind(),
            Payload::Group { .. } => ValueKind::Group,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.payload, Payload::Group { .. })
    }

    /// Default value; `None` for groups.
    pub fn default(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Item { default, .. } => Some(default),
            Payload::Group { .. } => None,
        }
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        match &self.payload {
            Payload::Item { constraint, .. } => constraint.as_ref(),
            Payload::Group { .. } => None,
        }
    }

    /// Child descriptors, in declaration order; empty for items.
    pub fn children(&self) -> &[Descriptor] {
        match &self.payload {
            Payload::Item { .. } => &[],
            Payload::Group { children } => children,
        }
    }

    /// Validates `value` against this descriptor's kind and constraint.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match &self.payload {
            Payload::Group { .. } => Err("group holds no value".to_string()),
            Payload::Item {
                default,
                constraint,
            } => {
                if value.kind() != default.kind() {
                    return Err(format!(
                        "expected a {} value, got {}",
                        default.kind(),
                        value.kind()
                    ));
                }
                if let Some(constraint) = constraint {
                    constraint.check(value)?;
                }
                Ok(())
            }
        }
    }
}

/// `"tick_rate"` -> `"Tick Rate"`.
fn derive_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
