//! Reference resolution
//!
//! Finds referenced units on disk through a list of search directories and
//! collects the type relations they declare.

use log::debug;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::ir::{CompiledUnit, TypeHierarchy};
use crate::utils::{Error, Result};

/// File extension of persisted units
pub const UNIT_EXTENSION: &str = "json";

/// Resolver for units referenced by the unit being woven
pub struct ReferenceResolver {
    /// Search directories, in insertion order
    search_paths: Vec<PathBuf>,
    /// Units read so far, by name
    loaded: HashMap<String, CompiledUnit>,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            loaded: HashMap::new(),
        }
    }

    /// Add a search directory; duplicates are ignored
    pub fn add_search_path(&mut self, path: PathBuf) -> bool {
        if self.search_paths.contains(&path) {
            return false;
        }
        self.search_paths.push(path);
        true
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find a unit file by unit name
    pub fn find_unit_file(&self, unit_name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(format!("{}.{}", unit_name, UNIT_EXTENSION)))
            .find(|path| path.exists())
    }

    /// Load a referenced unit by name
    pub fn load_unit(&mut self, unit_name: &str) -> Result<&CompiledUnit> {
        if !self.loaded.contains_key(unit_name) {
            let path = self.find_unit_file(unit_name).ok_or_else(|| Error::UnitNotFound {
                name: unit_name.to_string(),
            })?;
            let unit = CompiledUnit::read(&path)?;
            self.loaded.insert(unit_name.to_string(), unit);
        }

        self.loaded.get(unit_name).ok_or_else(|| Error::UnitNotFound {
            name: unit_name.to_string(),
        })
    }

    /// Forget a unit so the next lookup reads it from disk again
    pub fn invalidate(&mut self, unit_name: &str) {
        self.loaded.remove(unit_name);
    }

    /// Type relations declared by every unit reachable through references.
    /// Units that cannot be found are left out.
    pub fn hierarchy_for(&mut self, unit: &CompiledUnit) -> TypeHierarchy {
        let mut hierarchy = TypeHierarchy::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(unit.name.clone());
        let mut worklist: Vec<String> = unit.references.clone();

        while let Some(name) = worklist.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            match self.load_unit(&name) {
                Ok(referenced) => {
                    hierarchy.add_unit(referenced);
                    worklist.extend(referenced.references.iter().cloned());
                }
                Err(e) => debug!("Reference {} of {} not resolved: {}", name, unit.name, e),
            }
        }

        hierarchy
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory a referenced unit lives in; `None` when the path has no parent
pub fn containing_directory(path: &Path) -> Option<PathBuf> {
    match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Some(PathBuf::from(".")),
        Some(dir) => Some(dir.to_path_buf()),
        None => None,
    }
}
