//! Exclusion policy
//!
//! Suppresses weaving at unit, type and method granularity. Unit decisions
//! come from the exclusion settings and the unit's feature flags; type and
//! method decisions come from the exclusion marker attribute.

use std::collections::HashSet;
use std::fmt;

use super::display_class::ContainerClassifier;
use crate::ir::{CompiledUnit, MethodEntry, TypeEntry};
use crate::pipeline::flags;
use crate::pipeline::host::UnitDescriptor;
use crate::pipeline::settings::ExclusionSettings;

/// Marker attribute that disables weaving for the scope it is attached to
pub const EXCLUDE_ATTRIBUTE: &str = "WeaverExcludeAttribute";

/// Why a unit was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Output file is gone by the time the pass runs
    FileMissing,
    /// No descriptor in the project has this output path
    UnknownUnit,
    /// Output file exists but could not be read as a unit
    Unreadable,
    WeavingDisabled,
    ExcludedByName,
    BuildsOnly,
    EditorUnit,
    Marked,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::FileMissing => "its output file does not exist".to_string(),
            SkipReason::UnknownUnit => "no project unit has this output path".to_string(),
            SkipReason::Unreadable => "its output file could not be read".to_string(),
            SkipReason::WeavingDisabled => format!("{} is not defined", flags::WEAVER_ENABLED),
            SkipReason::ExcludedByName => "its name is in the exclude list".to_string(),
            SkipReason::BuildsOnly => format!(
                "{} is defined and this is not a release build",
                flags::WEAVER_BUILDS_ONLY
            ),
            SkipReason::EditorUnit => format!(
                "it is an editor unit and does not define {}",
                flags::WEAVER_INCLUDE_EDITOR_UNIT
            ),
            SkipReason::Marked => format!("it has the {}", EXCLUDE_ATTRIBUTE),
        };
        write!(f, "{}", s)
    }
}

/// Unit-level exclusion for one pass
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    excluded: HashSet<String>,
    release_build: bool,
}

impl ExclusionPolicy {
    pub fn new(settings: &ExclusionSettings, release_build: bool) -> Self {
        Self {
            excluded: settings.excluded_units.iter().cloned().collect(),
            release_build,
        }
    }

    /// First reason the unit must not be woven, checked in a fixed order
    pub fn unit_skip_reason(&self, unit: &UnitDescriptor) -> Option<SkipReason> {
        if !unit.defines(flags::WEAVER_ENABLED) {
            return Some(SkipReason::WeavingDisabled);
        }
        if self.excluded.contains(&unit.name) {
            return Some(SkipReason::ExcludedByName);
        }
        if !self.release_build && unit.defines(flags::WEAVER_BUILDS_ONLY) {
            return Some(SkipReason::BuildsOnly);
        }
        if unit.editor_only && !unit.defines(flags::WEAVER_INCLUDE_EDITOR_UNIT) {
            return Some(SkipReason::EditorUnit);
        }
        None
    }

    pub fn should_weave_unit(&self, unit: &UnitDescriptor) -> bool {
        self.unit_skip_reason(unit).is_none()
    }

    /// Marker check on the loaded unit itself
    pub fn should_weave_compiled(&self, unit: &CompiledUnit) -> bool {
        !unit.has_attribute(EXCLUDE_ATTRIBUTE)
    }
}

/// Type- and method-level exclusion driven by the marker attribute
pub struct ScopeExclusion {
    classifier: ContainerClassifier,
}

impl ScopeExclusion {
    pub fn new() -> Self {
        Self {
            classifier: ContainerClassifier::new(),
        }
    }

    /// `parent` is the declaring type when `ty` is nested
    pub fn should_weave_type(&self, parent: Option<&TypeEntry>, ty: &TypeEntry) -> bool {
        if ty.has_attribute(EXCLUDE_ATTRIBUTE) {
            return false;
        }

        // Only compiler-synthesized containers inherit from an origin method
        if !ty.compiler_generated {
            return true;
        }
        let (Some(parent), Some(origin)) = (parent, self.classifier.origin_method_name(&ty.name))
        else {
            return true;
        };

        // Only the first method the container was generated for decides
        let source = parent
            .methods
            .iter()
            .filter(|m| m.name == origin)
            .find(|m| self.classifier.is_generated_container_for(ty, m));

        match source {
            Some(method) => !method.has_attribute(EXCLUDE_ATTRIBUTE),
            None => true,
        }
    }

    pub fn should_weave_method(&self, ty: &TypeEntry, method: &MethodEntry) -> bool {
        if method.has_attribute(EXCLUDE_ATTRIBUTE) {
            return false;
        }
        match ty.property_for_accessor(&method.name) {
            Some(property) => !property.has_attribute(EXCLUDE_ATTRIBUTE),
            None => true,
        }
    }
}

impl Default for ScopeExclusion {
    fn default() -> Self {
        Self::new()
    }
}
