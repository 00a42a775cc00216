//! Pipeline - compilation hooks, settings and reference resolution

pub mod flags;
pub mod host;
pub mod orchestrator;
pub mod resolver;
pub mod settings;

pub use host::{CompilationHost, ManifestHost, ProjectManifest, UnitDescriptor};
pub use orchestrator::{
    Orchestrator, OrchestratorConfig, PassOutcome, PassReport, PassSkip, Phase, RebuildReason,
    DEFAULT_WEAVER_UNIT,
};
pub use resolver::ReferenceResolver;
pub use settings::{ExclusionSettings, SETTINGS_FILE_NAME};
