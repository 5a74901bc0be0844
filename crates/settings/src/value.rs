use serde::{Deserialize, Serialize};
use strum::Display;

/// Kind of value a descriptor declares. `Group` marks a container of
/// child descriptors rather than an editable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Integer,
    Float,
    Text,
    Choice,
    Color,
    Group,
}

/// A setting value. Closed set: adding a kind means adding a variant
/// here plus a control mapping in the dialog layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// One entry out of a choice list, stored by name.
    Choice(String),
    /// RGBA.
    Color([u8; 4]),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Choice(_) => ValueKind::Choice,
            Value::Color(_) => ValueKind::Color,
        }
    }
}

/// Optional validator constraining acceptable values of a leaf
/// descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    IntegerRange { min: i64, max: i64 },
    FloatRange { min: f64, max: f64 },
    /// Maximum length of a text value, in characters.
    MaxLength(usize),
    /// The admissible names for a choice value.
    OneOf(Vec<String>),
}

impl Constraint {
    /// Checks `value`, returning a human-readable reason on rejection.
    /// A constraint applied to a value of the wrong kind is itself a
    /// rejection.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Constraint::IntegerRange { min, max }, Value::Integer(v)) => {
                if v < min || v > max {
                    Err(format!("{v} is outside {min}..={max}"))
                } else {
                    Ok(())
                }
            }
            (Constraint::FloatRange { min, max }, Value::Float(v)) => {
                if v < min || v > max {
                    Err(format!("{v} is outside {min}..={max}"))
                } else {
                    Ok(())
                }
            }
            (Constraint::MaxLength(max), Value::Text(s)) => {
                let len = s.chars().count();
                if len > *max {
                    Err(format!("{len} characters exceeds the maximum of {max}"))
                } else {
                    Ok(())
                }
            }
            (Constraint::OneOf(choices), Value::Choice(c)) => {
                if choices.iter().any(|choice| choice == c) {
                    Ok(())
                } else {
                    Err(format!("{c:?} is not one of {choices:?}"))
                }
            }
            _ => Err(format!(
                "constraint does not apply to a {} value",
                value.kind()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let range = Constraint::IntegerRange { min: 1, max: 240 };
        assert!(range.check(&Value::Integer(1)).is_ok());
        assert!(range.check(&Value::Integer(240)).is_ok());
        assert!(range.check(&Value::Integer(0)).is_err());
        assert!(range.check(&Value::Integer(241)).is_err());
    }

    #[test]
    fn constraint_on_wrong_kind_is_rejected() {
        let range = Constraint::IntegerRange { min: 0, max: 10 };
        assert!(range.check(&Value::Bool(true)).is_err());
    }

    #[test]
    fn max_length_counts_characters() {
        let max = Constraint::MaxLength(3);
        assert!(max.check(&Value::Text("äöü".into())).is_ok());
        assert!(max.check(&Value::Text("äöüß".into())).is_err());
    }
}
