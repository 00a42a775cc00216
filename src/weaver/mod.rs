//! Weaver - call-site rewriting passes over compiled units

pub mod display_class;
pub mod exclusion;
pub mod network_capture;
pub mod rewrite;
pub mod type_flow;

use log::Level;

use crate::ir::{CompiledUnit, TypeHierarchy};
use crate::utils::{Error, Result};

pub use network_capture::{CaptureOptions, NetworkCaptureWeaver, TargetPlatform};
pub use rewrite::{CallSite, WrapperRule};

/// Per-unit state shared by every weaver
#[derive(Debug, Clone, Default)]
pub struct WeaveContext {
    /// Relations of every type visible from the unit being woven
    pub hierarchy: TypeHierarchy,
    /// Emit skip/replace decisions at info level
    pub verbose: bool,
}

impl WeaveContext {
    pub fn new(hierarchy: TypeHierarchy) -> Self {
        Self {
            hierarchy,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Level used for decision traces
    pub fn trace_level(&self) -> Level {
        if self.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

/// A rule set applied to whole compiled units
pub trait Weaver {
    /// Name of the weaver
    fn name(&self) -> &'static str;

    /// Declare platform types the rule set reasons about
    fn seed_types(&self, _hierarchy: &mut TypeHierarchy) {}

    /// Rewrite the unit in place, returning whether anything changed
    fn weave_unit(&self, unit: &mut CompiledUnit, ctx: &WeaveContext) -> Result<bool>;
}

/// Ordered set of weavers; earlier weavers take precedence
pub struct WeaverRegistry {
    weavers: Vec<Box<dyn Weaver>>,
}

impl WeaverRegistry {
    pub fn new(options: &CaptureOptions) -> Self {
        let mut registry = Self::empty();
        // Weavers run in registration order
        registry.add_weaver(Box::new(NetworkCaptureWeaver::new(options)));
        registry
    }

    pub fn empty() -> Self {
        Self {
            weavers: Vec::new(),
        }
    }

    pub fn add_weaver(&mut self, weaver: Box<dyn Weaver>) {
        self.weavers.push(weaver);
    }

    pub fn is_empty(&self) -> bool {
        self.weavers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.weavers.iter().map(|w| w.name()).collect()
    }

    pub fn seed_types(&self, hierarchy: &mut TypeHierarchy) {
        for weaver in &self.weavers {
            weaver.seed_types(hierarchy);
        }
    }

    /// Run every weaver over the unit. The first failure aborts the unit.
    pub fn weave(&self, unit: &mut CompiledUnit, ctx: &WeaveContext) -> Result<bool> {
        let mut changed = false;
        for weaver in &self.weavers {
            let woven = weaver.weave_unit(unit, ctx).map_err(|e| Error::Weaver {
                weaver: weaver.name().to_string(),
                unit: unit.name.clone(),
                source: Box::new(e),
            })?;
            changed |= woven;
        }
        Ok(changed)
    }
}

impl Default for WeaverRegistry {
    fn default() -> Self {
        Self::new(&CaptureOptions::default())
    }
}
