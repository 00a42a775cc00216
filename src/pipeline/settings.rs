//! Exclusion settings
//!
//! A flat, human-editable list of unit names the weaver must never touch.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::host::UnitDescriptor;
use crate::utils::{Error, Result};

/// Default file name, next to the project manifest
pub const SETTINGS_FILE_NAME: &str = "WeaverSettings.json";

/// Name prefixes of framework/engine-provided units
pub const FRAMEWORK_PREFIXES: &[&str] = &["Unity.", "UnityEngine.", "UnityEditor."];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSettings {
    #[serde(default)]
    pub excluded_units: Vec<String>,
}

impl ExclusionSettings {
    /// Exclude every framework-provided unit of the project
    pub fn defaults_for(units: &[UnitDescriptor]) -> Self {
        let mut settings = Self::default();
        settings.reset(units);
        settings
    }

    pub fn reset(&mut self, units: &[UnitDescriptor]) {
        self.excluded_units = units
            .iter()
            .filter(|u| is_framework_unit(&u.name))
            .map(|u| u.name.clone())
            .collect();
    }

    /// Load the settings file, falling back to defaults when it is absent
    /// or cannot be parsed
    pub fn load(path: &Path, units: &[UnitDescriptor]) -> Self {
        if !path.exists() {
            warn!(
                "Weaver settings not found at {}, using default exclusions",
                path.display()
            );
            return Self::defaults_for(units);
        }
        match Self::read(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                Self::defaults_for(units)
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::json(path, e))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| Error::json(path, e))?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        fs::write(path, text).map_err(|e| Error::io(path, e))
    }

    pub fn is_excluded(&self, unit_name: &str) -> bool {
        self.excluded_units.iter().any(|n| n == unit_name)
    }
}

pub fn is_framework_unit(name: &str) -> bool {
    FRAMEWORK_PREFIXES.iter().any(|p| name.starts_with(p))
}
