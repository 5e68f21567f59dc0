//! Stage identity.
//!
//! Every stage carries a [`ModuleInfo`]: the instance name that must be unique
//! within one pipeline, plus descriptive metadata about the module type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix appended to a watched stage's instance name to name its observer.
pub const OBSERVER_SUFFIX: &str = "#observer";

/// Identity and metadata of one stage instance. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleInfo {
    instance_name: String,
    name: String,
    version: String,
    description: String,
}

impl ModuleInfo {
    /// Info for `instance_name`; the module name defaults to the instance name.
    pub fn new(instance_name: impl Into<String>) -> Self {
        let instance_name = instance_name.into();
        Self {
            name: instance_name.clone(),
            instance_name,
            version: String::new(),
            description: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Unique name of this instance within its pipeline.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Module type name, shared by every instance of the same module.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Identity of the observer attached to this stage.
    pub(crate) fn observer(&self) -> Self {
        Self {
            instance_name: format!("{}{}", self.instance_name, OBSERVER_SUFFIX),
            name: self.name.clone(),
            version: self.version.clone(),
            description: format!("observer of '{}'", self.instance_name),
        }
    }
}

impl fmt::Display for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.instance_name {
            write!(f, "{}", self.instance_name)
        } else {
            write!(f, "{} ({})", self.instance_name, self.name)
        }
    }
}
