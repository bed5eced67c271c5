use regex::Regex;
use serde_yaml::Value;

use crate::error::ParamError;
use crate::value::ParamValue;

/// # Explanation
/// An ordered list of parameter overrides. When the same key appears more than once the later entry wins,
/// since the overrides are applied one after another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    entries: Vec<(String, ParamValue)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style variant of push.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn extend(&mut self, other: Overrides) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// # Explanation
    /// Parses an assignment of the form `key=value` (as given on the command line). The value is read as
    /// yaml so that `true`, `12` or `1.5` end up as a bool, an integer or a float. A value that is not valid
    /// yaml is taken as a plain string. An empty value is the empty string.
    pub fn parse_assignment(assignment: &str) -> Result<(String, ParamValue), ParamError> {
        let re = Regex::new(r"^\s*(?P<key>[A-Za-z_][A-Za-z0-9_.\-]*)\s*=(?P<value>.*)$")
            .map_err(|_| ParamError::InvalidAssignment(assignment.to_string()))?;
        let caps = re
            .captures(assignment)
            .ok_or_else(|| ParamError::InvalidAssignment(assignment.to_string()))?;

        let key = caps["key"].to_string();
        let raw_value = caps["value"].trim();
        let value = if raw_value.is_empty() {
            Value::String(String::new())
        } else {
            match serde_yaml::from_str::<Value>(raw_value) {
                // only an explicit null stays null, `#foo` parses as a bare comment
                Ok(Value::Null) if !is_yaml_null(raw_value) => {
                    Value::String(raw_value.to_string())
                }
                Ok(value) => value,
                Err(_) => Value::String(raw_value.to_string()),
            }
        };

        Ok((key, value))
    }
}

fn is_yaml_null(raw_value: &str) -> bool {
    matches!(raw_value, "~" | "null" | "Null" | "NULL")
}
