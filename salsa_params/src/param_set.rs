use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::ParamError;
use crate::overrides::Overrides;
use crate::value::ParamValue;

/// # Explanation
/// The parameter record of the estimator: a mapping from keys to yaml values. The order of the keys in the
/// base file is kept. Overriding a key replaces the value in place, a new key is appended at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    mapping: Mapping,
}

impl ParamSet {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ParamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_yaml_str(&content)?;
        log::debug!(
            "Loaded {} parameters from {}.",
            params.len(),
            path.display()
        );
        Ok(params)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ParamError> {
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => Ok(Self { mapping }),
            _ => Err(ParamError::NotAMapping),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.mapping.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.mapping.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Keys in file order. Non string keys are skipped.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys().filter_map(|key| key.as_str())
    }

    /// # Returns
    /// Returns the value the key had before, if any.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.mapping
            .insert(Value::String(key.to_string()), value.into())
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        for (key, value) in overrides.iter() {
            match self.set(key, value.clone()) {
                Some(old) => log::debug!("Override {}: {:?} -> {:?}", key, old, value),
                None => log::debug!("Set {}: {:?} (not in the base parameters)", key, value),
            }
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, ParamError> {
        Ok(serde_yaml::to_string(&self.mapping)?)
    }

    /// # Explanation
    /// Writes the record as yaml. The parent directory is created if it does not exist yet.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamError> {
        let path = path.as_ref();
        let io_err = |source| ParamError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_yaml_string()?).map_err(io_err)?;

        log::info!("Wrote {} parameters to {}.", self.len(), path.display());
        Ok(())
    }
}
