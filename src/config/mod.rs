//! Configuration module for laneflow
//!
//! A [`Configuration`] is a flat, key-prefixed settings store. Keys are dotted
//! paths (`reader.batch_size`, `pipeline.name`) and values are simple
//! [`ConfigValue`] scalars. The pipeline never interprets values itself; it only
//! slices the store by stage instance name and hands each stage its slice.
//!
//! # Sources
//!
//! Configurations can be built programmatically or loaded from TOML/JSON text.
//! Nested tables are flattened into dotted keys:
//!
//! ```toml
//! [reader]
//! batch_size = 100
//!
//! [writer.sink]
//! path = "/tmp/out"
//! ```
//!
//! yields `reader.batch_size = 100` and `writer.sink.path = "/tmp/out"`.
//!
//! # Example
//!
//! ```
//! use laneflow::config::{ConfigValue, Configuration};
//!
//! let mut conf = Configuration::new();
//! conf.set("reader.batch_size", 100);
//! conf.set("writer.path", "/tmp/out");
//!
//! let reader = conf.subset("reader");
//! assert_eq!(reader.get_int("batch_size"), Some(100));
//! assert!(reader.get("path").is_none());
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix of the pipeline-wide configuration subset.
pub const PIPELINE_PREFIX: &str = "pipeline";

/// Separator between key path segments
pub const KEY_SEPARATOR: char = '.';

/// A scalar configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, with integers widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            ConfigValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(v as i64)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

/// Flat key-prefixed settings store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    entries: BTreeMap<String, ConfigValue>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous value under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_int)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ConfigValue::as_float)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose key starts with `prefix.`, with that prefix stripped.
    ///
    /// A trailing separator on `prefix` is accepted, so `subset("reader")` and
    /// `subset("reader.")` are equivalent. A key equal to the bare prefix is
    /// not part of the subset.
    pub fn subset(&self, prefix: &str) -> Configuration {
        let prefix = prefix.trim_end_matches(KEY_SEPARATOR);
        let mut scoped = String::with_capacity(prefix.len() + 1);
        scoped.push_str(prefix);
        scoped.push(KEY_SEPARATOR);

        let entries = self
            .entries
            .range(scoped.clone()..)
            .take_while(|(k, _)| k.starts_with(&scoped))
            .filter(|(k, _)| k.len() > scoped.len())
            .map(|(k, v)| (k[scoped.len()..].to_string(), v.clone()))
            .collect();
        Configuration { entries }
    }

    /// Merge `other` into `self`, `other` winning on conflicting keys.
    pub fn merge(&mut self, other: Configuration) {
        self.entries.extend(other.entries);
    }

    /// Parse TOML text, flattening nested tables into dotted keys.
    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        let table: toml::Table = content
            .parse()
            .map_err(|e| PipelineError::Config(format!("Failed to parse TOML: {}", e)))?;
        let mut conf = Configuration::new();
        for (key, value) in table {
            flatten_toml(&mut conf, key, value)?;
        }
        Ok(conf)
    }

    /// Parse a JSON object, flattening nested objects into dotted keys.
    pub fn from_json_str(content: &str) -> PipelineResult<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| PipelineError::Config(format!("Failed to parse JSON: {}", e)))?;
        let serde_json::Value::Object(map) = value else {
            return Err(PipelineError::Config(
                "JSON configuration must be an object".to_string(),
            ));
        };
        let mut conf = Configuration::new();
        for (key, value) in map {
            flatten_json(&mut conf, key, value)?;
        }
        Ok(conf)
    }

    /// Load a configuration file; the format is chosen by extension
    /// (`.toml` or `.json`).
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let conf = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(PipelineError::Config(format!(
                    "Unsupported configuration format: {:?}",
                    other
                )))
            }
        };
        tracing::debug!("Loaded {} configuration entries from {:?}", conf.len(), path);
        Ok(conf)
    }
}

impl<K, V> FromIterator<(K, V)> for Configuration
where
    K: Into<String>,
    V: Into<ConfigValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Configuration {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    format!("{}{}{}", prefix, KEY_SEPARATOR, key)
}

fn flatten_toml(conf: &mut Configuration, key: String, value: toml::Value) -> PipelineResult<()> {
    match value {
        toml::Value::Table(table) => {
            for (child, value) in table {
                flatten_toml(conf, join_key(&key, &child), value)?;
            }
        }
        toml::Value::Boolean(b) => {
            conf.set(key, b);
        }
        toml::Value::Integer(i) => {
            conf.set(key, i);
        }
        toml::Value::Float(f) => {
            conf.set(key, f);
        }
        toml::Value::String(s) => {
            conf.set(key, s);
        }
        toml::Value::Datetime(dt) => {
            conf.set(key, dt.to_string());
        }
        toml::Value::Array(_) => {
            return Err(PipelineError::Config(format!(
                "Arrays are not supported (key '{}')",
                key
            )))
        }
    }
    Ok(())
}

fn flatten_json(
    conf: &mut Configuration,
    key: String,
    value: serde_json::Value,
) -> PipelineResult<()> {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            for (child, value) in map {
                flatten_json(conf, join_key(&key, &child), value)?;
            }
        }
        Value::Bool(b) => {
            conf.set(key, b);
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                conf.set(key, i);
            } else if let Some(f) = n.as_f64() {
                conf.set(key, f);
            } else {
                return Err(PipelineError::Config(format!(
                    "Number out of range (key '{}')",
                    key
                )));
            }
        }
        Value::String(s) => {
            conf.set(key, s);
        }
        Value::Null => {}
        Value::Array(_) => {
            return Err(PipelineError::Config(format!(
                "Arrays are not supported (key '{}')",
                key
            )))
        }
    }
    Ok(())
}
