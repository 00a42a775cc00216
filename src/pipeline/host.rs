//! Compilation host
//!
//! The external compiler pipeline the orchestrator is driven by. It lists the
//! project's units and can be asked to rebuild everything from scratch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::{Error, Result};
use crate::weaver::CaptureOptions;

/// The compiler's view of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    pub name: String,
    pub output_path: PathBuf,
    #[serde(default)]
    pub defines: BTreeSet<String>,
    /// Names of referenced project units
    #[serde(default)]
    pub unit_references: Vec<String>,
    /// Paths of referenced prebuilt units
    #[serde(default)]
    pub precompiled_references: Vec<PathBuf>,
    /// Development or tooling unit that does not ship with the application
    #[serde(default)]
    pub editor_only: bool,
}

impl UnitDescriptor {
    pub fn defines(&self, flag: &str) -> bool {
        self.defines.contains(flag)
    }
}

pub trait CompilationHost {
    /// Every unit in the project; empty while the project is still cold
    fn units(&self) -> Vec<UnitDescriptor>;

    /// Defines configured for the whole project; available before any unit is listed
    fn project_defines(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    /// Whether this compile produces a release build
    fn is_release_build(&self) -> bool;

    /// Ask for a clean rebuild of every unit
    fn request_full_rebuild(&mut self);
}

/// Project description written by the build system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub units: Vec<UnitDescriptor>,
    /// Defines applied to every unit of the project
    #[serde(default)]
    pub project_defines: BTreeSet<String>,
    #[serde(default)]
    pub release_build: bool,
    #[serde(default)]
    pub capture: CaptureOptions,
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
}

impl ProjectManifest {
    /// Load a manifest; relative paths inside it are taken relative to its directory
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut manifest: ProjectManifest =
            serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;

        let base = path.parent().unwrap_or(Path::new("."));
        for unit in &mut manifest.units {
            unit.output_path = resolve(base, &unit.output_path);
            for reference in &mut unit.precompiled_references {
                *reference = resolve(base, reference);
            }
        }
        if let Some(settings) = &manifest.settings_path {
            manifest.settings_path = Some(resolve(base, settings));
        }
        Ok(manifest)
    }
}

/// Join `path` onto `base` unless it is already absolute
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Host backed by a static manifest; rebuild requests are recorded
#[derive(Debug, Clone)]
pub struct ManifestHost {
    manifest: ProjectManifest,
    rebuild_requested: bool,
}

impl ManifestHost {
    pub fn new(manifest: ProjectManifest) -> Self {
        Self {
            manifest,
            rebuild_requested: false,
        }
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    pub fn set_release_build(&mut self, release: bool) {
        self.manifest.release_build = release;
    }

    pub fn rebuild_requested(&self) -> bool {
        self.rebuild_requested
    }
}

impl CompilationHost for ManifestHost {
    fn units(&self) -> Vec<UnitDescriptor> {
        self.manifest.units.clone()
    }

    fn project_defines(&self) -> BTreeSet<String> {
        self.manifest.project_defines.clone()
    }

    fn is_release_build(&self) -> bool {
        self.manifest.release_build
    }

    fn request_full_rebuild(&mut self) {
        self.rebuild_requested = true;
    }
}
