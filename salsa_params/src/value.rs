use serde_yaml::{Mapping, Number, Value};

/// A single parameter value as the estimator reads it from its yaml file.
pub type ParamValue = Value;

/// # Explanation
/// Converts a toml value (as found in an experiment description) into the yaml value that is written
/// into the derived parameter file. Toml datetimes have no yaml counterpart the estimator understands,
/// so they are written as strings.
pub fn toml_to_yaml(value: &toml::Value) -> ParamValue {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number(Number::from(*i)),
        toml::Value::Float(x) => Value::Number(Number::from(*x)),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => {
            let mut mapping = Mapping::new();
            for (key, value) in table {
                mapping.insert(Value::String(key.clone()), toml_to_yaml(value));
            }
            Value::Mapping(mapping)
        }
    }
}
