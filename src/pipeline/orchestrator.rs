//! Compilation orchestrator
//!
//! Decides which compiled units to weave and when. Driven by the host's
//! compilation callbacks:
//!
//! - `compilation_started` begins collecting dirty units
//! - `unit_compiled` records each unit the compiler finished
//! - `compilation_finished` decides whether to weave, rebuild or skip,
//!   then weaves the dirty units one at a time

use log::{error, info, log, warn, Level};
use std::path::{Path, PathBuf};

use super::flags;
use super::host::{CompilationHost, UnitDescriptor};
use super::resolver::{containing_directory, ReferenceResolver};
use super::settings::ExclusionSettings;
use crate::ir::{CompiledUnit, TypeHierarchy};
use crate::utils::Result;
use crate::weaver::exclusion::{ExclusionPolicy, SkipReason};
use crate::weaver::{WeaveContext, WeaverRegistry};

/// Name of the unit the weaver itself is compiled into
pub const DEFAULT_WEAVER_UNIT: &str = "Callweave.Editor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collecting,
    Deciding,
    Weaving,
}

/// State carried between the callbacks of one pass
#[derive(Debug, Default)]
pub struct PassState {
    /// Output paths of units compiled since the pass started
    dirty: Vec<PathBuf>,
    /// A full rebuild was already requested and has not yet been followed by a pass
    did_force_rebuild: bool,
}

impl PassState {
    fn reset(&mut self) {
        self.dirty.clear();
    }

    fn mark_dirty(&mut self, path: PathBuf) {
        if !self.dirty.contains(&path) {
            self.dirty.push(path);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildReason {
    /// The weaver's own unit changed; every unit must return to its unwoven state
    WeaverChanged,
    /// The host has not produced a unit list yet
    EmptyProject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassSkip {
    NoWeavers,
    /// No unit in the project defines the master switch
    WeavingDisabled,
    /// Still no units after a forced rebuild
    NoUnits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Skipped(PassSkip),
    RebuildRequested(RebuildReason),
    Completed(PassReport),
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub weaver_unit: String,
    pub settings_path: PathBuf,
}

/// Drives weaving passes over the units of a project
pub struct Orchestrator {
    registry: WeaverRegistry,
    config: OrchestratorConfig,
    state: PassState,
    phase: Phase,
}

impl Orchestrator {
    pub fn new(registry: WeaverRegistry, config: OrchestratorConfig) -> Self {
        Self {
            registry,
            config,
            state: PassState::default(),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dirty_units(&self) -> &[PathBuf] {
        &self.state.dirty
    }

    pub fn did_force_rebuild(&self) -> bool {
        self.state.did_force_rebuild
    }

    pub fn compilation_started(&mut self) {
        self.state.reset();
        self.phase = Phase::Collecting;
    }

    pub fn unit_compiled(&mut self, output_path: PathBuf) {
        if self.phase != Phase::Collecting {
            warn!(
                "Unit {} finished outside of a compilation; collecting it anyway",
                output_path.display()
            );
            self.phase = Phase::Collecting;
        }
        self.state.mark_dirty(output_path);
    }

    /// Run the pass. A weaver failure aborts the remaining units.
    pub fn compilation_finished(&mut self, host: &mut dyn CompilationHost) -> Result<PassOutcome> {
        self.phase = Phase::Deciding;
        let outcome = self.run_pass(host);
        self.phase = Phase::Idle;
        outcome
    }

    fn run_pass(&mut self, host: &mut dyn CompilationHost) -> Result<PassOutcome> {
        if self.registry.is_empty() {
            return Ok(PassOutcome::Skipped(PassSkip::NoWeavers));
        }

        let units = host.units();
        let project_defines = host.project_defines();
        let defined =
            |flag: &str| project_defines.contains(flag) || units.iter().any(|u| u.defines(flag));

        // Leaves build caches alone in projects that never enable weaving
        if !defined(flags::WEAVER_ENABLED) {
            return Ok(PassOutcome::Skipped(PassSkip::WeavingDisabled));
        }

        let verbose = defined(flags::WEAVER_VERBOSE_LOGGING);
        let level = if verbose { Level::Info } else { Level::Debug };

        let weaver_changed = self
            .state
            .dirty
            .iter()
            .any(|p| unit_name_of(p).as_deref() == Some(self.config.weaver_unit.as_str()));

        if weaver_changed && !self.state.did_force_rebuild {
            log!(level, "Forcing a full project rebuild due to the weaver unit being rebuilt.");
            self.state.did_force_rebuild = true;
            host.request_full_rebuild();
            return Ok(PassOutcome::RebuildRequested(RebuildReason::WeaverChanged));
        }

        // A cold project has no unit list yet; only reachable through project defines
        if units.is_empty() {
            if self.state.did_force_rebuild {
                return Ok(PassOutcome::Skipped(PassSkip::NoUnits));
            }
            info!("Forcing a full project rebuild due to an empty unit list.");
            self.state.did_force_rebuild = true;
            host.request_full_rebuild();
            return Ok(PassOutcome::RebuildRequested(RebuildReason::EmptyProject));
        }

        self.state.did_force_rebuild = false;

        // The weaver was not loaded when compilation started (fresh import)
        if self.state.dirty.is_empty() {
            log!(level, "Dirty unit list empty, weaving all units.");
            self.state.dirty = units.iter().map(|u| u.output_path.clone()).collect();
        }

        self.phase = Phase::Weaving;
        let settings = ExclusionSettings::load(&self.config.settings_path, &units);
        let policy = ExclusionPolicy::new(&settings, host.is_release_build());
        let mut resolver = build_resolver(&units);

        let mut report = PassReport::default();
        let dirty = self.state.dirty.clone();
        for path in dirty {
            match self.weave_path(&path, &units, &policy, &mut resolver, verbose)? {
                UnitResult::Written => report.written.push(path),
                UnitResult::Unchanged => report.unchanged.push(path),
                UnitResult::Skipped(reason) => report.skipped.push((path, reason)),
            }
        }

        if !report.written.is_empty() {
            let listing: Vec<String> = report
                .written
                .iter()
                .map(|p| format!("    {}", p.display()))
                .collect();
            info!("Weaver modified the following units:\n{}", listing.join("\n"));
        }

        Ok(PassOutcome::Completed(report))
    }

    fn weave_path(
        &self,
        path: &Path,
        units: &[UnitDescriptor],
        policy: &ExclusionPolicy,
        resolver: &mut ReferenceResolver,
        verbose: bool,
    ) -> Result<UnitResult> {
        let level = if verbose { Level::Info } else { Level::Debug };

        if !path.exists() {
            warn!("Weaver skipped a unit path that did not exist: {}", path.display());
            return Ok(UnitResult::Skipped(SkipReason::FileMissing));
        }

        let Some(descriptor) = units.iter().find(|u| u.output_path == path) else {
            warn!("Failed to find a unit with output path: {}", path.display());
            return Ok(UnitResult::Skipped(SkipReason::UnknownUnit));
        };

        if let Some(reason) = policy.unit_skip_reason(descriptor) {
            log!(level, "Weaver skipped unit {} because {}", descriptor.name, reason);
            return Ok(UnitResult::Skipped(reason));
        }

        let mut unit = match CompiledUnit::read(path) {
            Ok(unit) => unit,
            Err(e) => {
                error!("Failed to read unit for weaving: {}", e);
                return Ok(UnitResult::Skipped(SkipReason::Unreadable));
            }
        };

        if !policy.should_weave_compiled(&unit) {
            let reason = SkipReason::Marked;
            log!(level, "Weaver skipped unit {} because {}", descriptor.name, reason);
            return Ok(UnitResult::Skipped(reason));
        }

        let mut hierarchy = TypeHierarchy::new();
        self.registry.seed_types(&mut hierarchy);
        hierarchy.merge(&resolver.hierarchy_for(&unit));
        hierarchy.add_unit(&unit);
        let ctx = WeaveContext::new(hierarchy).with_verbose(verbose);

        let changed = match self.registry.weave(&mut unit, &ctx) {
            Ok(changed) => changed,
            Err(e) => {
                error!("{}", e);
                return Err(e);
            }
        };

        if !changed {
            log!(
                level,
                "Weaver processed unit {} but did not make any modifications.",
                descriptor.name
            );
            return Ok(UnitResult::Unchanged);
        }

        log!(level, "Weaver writing changes to {}", path.display());
        unit.write(path)?;
        resolver.invalidate(&unit.name);
        Ok(UnitResult::Written)
    }
}

enum UnitResult {
    Written,
    Unchanged,
    Skipped(SkipReason),
}

/// Unit name from an output path: the file name without its extension
fn unit_name_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Search directories from every reference of every unit
fn build_resolver(units: &[UnitDescriptor]) -> ReferenceResolver {
    let mut resolver = ReferenceResolver::new();

    for unit in units {
        let project_refs = unit.unit_references.iter().filter_map(|name| {
            let found = units.iter().find(|u| &u.name == name).map(|u| u.output_path.clone());
            if found.is_none() {
                error!("Failed to resolve unit reference {} of {}", name, unit.name);
            }
            found
        });

        for path in project_refs.chain(unit.precompiled_references.iter().cloned()) {
            match containing_directory(&path) {
                Some(dir) => {
                    resolver.add_search_path(dir);
                }
                None => error!("Failed to parse directory name for path: {}", path.display()),
            }
        }
    }

    resolver
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CallKind, Instruction, Local, MethodEntry, MethodRef, Target, TypeEntry, VOID};
    use crate::pipeline::host::{ManifestHost, ProjectManifest};
    use crate::utils::Error;
    use crate::weaver::exclusion::EXCLUDE_ATTRIBUTE;
    use crate::weaver::network_capture::{IDISPOSABLE, NETWORK_CAPTURE, UNITY_WEB_REQUEST};
    use crate::weaver::{CaptureOptions, Weaver};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    struct Project {
        dir: TempDir,
        host: ManifestHost,
    }

    impl Project {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                host: ManifestHost::new(ProjectManifest::default()),
            }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(format!("{}.json", name))
        }

        fn add(&mut self, name: &str, defines: &[&str], unit: Option<CompiledUnit>) -> PathBuf {
            let path = self.path(name);
            if let Some(unit) = unit {
                unit.write(&path).unwrap();
            }
            let mut manifest = self.host.manifest().clone();
            manifest.units.push(UnitDescriptor {
                name: name.to_string(),
                output_path: path.clone(),
                defines: defines.iter().map(|d| d.to_string()).collect(),
                unit_references: Vec::new(),
                precompiled_references: Vec::new(),
                editor_only: false,
            });
            self.host = ManifestHost::new(manifest);
            path
        }

        fn define_project(&mut self, defines: &[&str]) {
            let mut manifest = self.host.manifest().clone();
            manifest.project_defines = defines.iter().map(|d| d.to_string()).collect();
            self.host = ManifestHost::new(manifest);
        }

        fn orchestrator(&self) -> Orchestrator {
            Orchestrator::new(
                WeaverRegistry::new(&CaptureOptions::default()),
                OrchestratorConfig {
                    weaver_unit: DEFAULT_WEAVER_UNIT.to_string(),
                    settings_path: self.dir.path().join("WeaverSettings.json"),
                },
            )
        }

        fn exclude(&self, names: &[&str]) {
            ExclusionSettings {
                excluded_units: names.iter().map(|n| n.to_string()).collect(),
            }
            .save(&self.dir.path().join("WeaverSettings.json"))
            .unwrap();
        }
    }

    fn networking_unit(name: &str) -> CompiledUnit {
        let mut ty = TypeEntry::new("Game", "Downloader");
        ty.methods.push(
            MethodEntry::new("Fetch", VOID)
                .with_locals(vec![Local::new(IDISPOSABLE)])
                .with_body(vec![
                    Instruction::call(
                        MethodRef::new("Game.Factory", "Create", &[], UNITY_WEB_REQUEST),
                        CallKind::Direct,
                    ),
                    Instruction::store(Target::Local { index: 0 }),
                    Instruction::load(Target::Local { index: 0 }),
                    Instruction::call(
                        MethodRef::instance(IDISPOSABLE, "Dispose", &[], VOID),
                        CallKind::Virtual,
                    ),
                    Instruction::other("ret"),
                ]),
        );
        let mut unit = CompiledUnit::new(name);
        unit.types.push(ty);
        unit
    }

    fn completed(outcome: PassOutcome) -> PassReport {
        match outcome {
            PassOutcome::Completed(report) => report,
            other => panic!("expected a completed pass, got {:?}", other),
        }
    }

    #[test]
    fn test_weaves_dirty_unit_and_persists() {
        let mut project = Project::new();
        let path = project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));
        let mut orch = project.orchestrator();

        orch.compilation_started();
        orch.unit_compiled(path.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());

        assert_eq!(report.written, vec![path.clone()]);
        assert_eq!(orch.phase(), Phase::Idle);
        let woven = CompiledUnit::read(&path).unwrap();
        let callee = woven.types[0].methods[0].instructions()[3].callee().unwrap();
        assert_eq!(callee.declaring_type, NETWORK_CAPTURE);
        assert_eq!(callee.name, "DisposeWebRequest");
    }

    #[test]
    fn test_excluded_unit_is_byte_identical() {
        let mut project = Project::new();
        let path = project.add("VendorLib", &[flags::WEAVER_ENABLED], Some(networking_unit("VendorLib")));
        project.exclude(&["VendorLib"]);
        let before = fs::read(&path).unwrap();

        let mut orch = project.orchestrator();
        orch.compilation_started();
        orch.unit_compiled(path.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());

        assert_eq!(report.skipped, vec![(path.clone(), SkipReason::ExcludedByName)]);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_marked_unit_is_skipped() {
        let mut project = Project::new();
        let mut unit = networking_unit("Game");
        unit.attributes.push(EXCLUDE_ATTRIBUTE.to_string());
        let path = project.add("Game", &[flags::WEAVER_ENABLED], Some(unit));
        let before = fs::read(&path).unwrap();

        let mut orch = project.orchestrator();
        orch.compilation_started();
        orch.unit_compiled(path.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());

        assert_eq!(report.skipped, vec![(path.clone(), SkipReason::Marked)]);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_no_enabled_unit_skips_pass() {
        let mut project = Project::new();
        let path = project.add("Game", &[], Some(networking_unit("Game")));
        let mut orch = project.orchestrator();
        orch.compilation_started();
        orch.unit_compiled(path);
        assert_eq!(
            orch.compilation_finished(&mut project.host).unwrap(),
            PassOutcome::Skipped(PassSkip::WeavingDisabled)
        );
    }

    #[test]
    fn test_weaver_rebuild_requested_once() {
        let mut project = Project::new();
        let game = project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));
        let weaver = project.add(DEFAULT_WEAVER_UNIT, &[], Some(CompiledUnit::new(DEFAULT_WEAVER_UNIT)));
        let mut orch = project.orchestrator();

        orch.compilation_started();
        orch.unit_compiled(weaver.clone());
        orch.unit_compiled(game.clone());
        assert_eq!(
            orch.compilation_finished(&mut project.host).unwrap(),
            PassOutcome::RebuildRequested(RebuildReason::WeaverChanged)
        );
        assert!(project.host.rebuild_requested());
        assert!(orch.did_force_rebuild());
        // Nothing was woven by the aborted pass
        assert_eq!(CompiledUnit::read(&game).unwrap(), networking_unit("Game"));

        // The rebuilt project recompiles everything, including the weaver
        orch.compilation_started();
        orch.unit_compiled(weaver);
        orch.unit_compiled(game.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());
        assert_eq!(report.written, vec![game]);
        assert!(!orch.did_force_rebuild());
    }

    #[test]
    fn test_cold_project_without_weaving_is_not_rebuilt() {
        let mut project = Project::new();
        let mut orch = project.orchestrator();
        orch.compilation_started();
        assert_eq!(
            orch.compilation_finished(&mut project.host).unwrap(),
            PassOutcome::Skipped(PassSkip::WeavingDisabled)
        );
        assert!(!project.host.rebuild_requested());
        assert!(!orch.did_force_rebuild());
    }

    #[test]
    fn test_empty_project_requests_rebuild_then_gives_up() {
        let mut project = Project::new();
        project.define_project(&[flags::WEAVER_ENABLED]);
        let mut orch = project.orchestrator();
        orch.compilation_started();
        assert_eq!(
            orch.compilation_finished(&mut project.host).unwrap(),
            PassOutcome::RebuildRequested(RebuildReason::EmptyProject)
        );
        assert!(project.host.rebuild_requested());
        orch.compilation_started();
        assert_eq!(
            orch.compilation_finished(&mut project.host).unwrap(),
            PassOutcome::Skipped(PassSkip::NoUnits)
        );
    }

    #[test]
    fn test_empty_dirty_set_weaves_everything() {
        let mut project = Project::new();
        let a = project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));
        let b = project.add("Ui", &[flags::WEAVER_ENABLED], Some(networking_unit("Ui")));
        let mut orch = project.orchestrator();

        orch.compilation_started();
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());
        assert_eq!(report.written, vec![a, b]);
    }

    #[test]
    fn test_missing_file_is_skipped_and_pass_continues() {
        let mut project = Project::new();
        let missing = project.add("Gone", &[flags::WEAVER_ENABLED], None);
        let game = project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));
        let mut orch = project.orchestrator();

        orch.compilation_started();
        orch.unit_compiled(missing.clone());
        orch.unit_compiled(game.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());
        assert_eq!(report.skipped, vec![(missing, SkipReason::FileMissing)]);
        assert_eq!(report.written, vec![game]);
    }

    #[test]
    fn test_project_define_enables_weaving() {
        let mut project = Project::new();
        let path = project.add("Game", &[], Some(networking_unit("Game")));
        project.define_project(&[flags::WEAVER_ENABLED]);
        let mut orch = project.orchestrator();

        orch.compilation_started();
        orch.unit_compiled(path.clone());
        // The pass runs, but the unit itself still has to opt in
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());
        assert_eq!(report.skipped, vec![(path, SkipReason::WeavingDisabled)]);
    }

    #[test]
    fn test_path_outside_project_is_skipped() {
        let mut project = Project::new();
        let game = project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));
        let stray = project.path("Stray");
        networking_unit("Stray").write(&stray).unwrap();
        let before = fs::read(&stray).unwrap();

        let mut orch = project.orchestrator();
        orch.compilation_started();
        orch.unit_compiled(stray.clone());
        orch.unit_compiled(game.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());

        assert_eq!(report.skipped, vec![(stray.clone(), SkipReason::UnknownUnit)]);
        assert_eq!(report.written, vec![game]);
        assert_eq!(fs::read(&stray).unwrap(), before);
    }

    #[test]
    fn test_unreadable_unit_is_skipped_and_pass_continues() {
        let mut project = Project::new();
        let corrupt = project.add("Corrupt", &[flags::WEAVER_ENABLED], None);
        fs::write(&corrupt, "not a unit").unwrap();
        let game = project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));

        let mut orch = project.orchestrator();
        orch.compilation_started();
        orch.unit_compiled(corrupt.clone());
        orch.unit_compiled(game.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());

        assert_eq!(report.skipped, vec![(corrupt.clone(), SkipReason::Unreadable)]);
        assert_eq!(report.written, vec![game]);
        assert_eq!(fs::read_to_string(&corrupt).unwrap(), "not a unit");
    }

    #[test]
    fn test_builds_only_unit_waits_for_release() {
        let mut project = Project::new();
        let path = project.add(
            "Game",
            &[flags::WEAVER_ENABLED, flags::WEAVER_BUILDS_ONLY],
            Some(networking_unit("Game")),
        );
        let mut orch = project.orchestrator();

        orch.compilation_started();
        orch.unit_compiled(path.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());
        assert_eq!(report.skipped, vec![(path.clone(), SkipReason::BuildsOnly)]);
        assert_eq!(CompiledUnit::read(&path).unwrap(), networking_unit("Game"));

        project.host.set_release_build(true);
        orch.compilation_started();
        orch.unit_compiled(path.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());
        assert_eq!(report.written, vec![path]);
    }

    #[test]
    fn test_unit_without_matches_is_not_rewritten() {
        let mut project = Project::new();
        let mut quiet = CompiledUnit::new("Quiet");
        quiet.types.push(TypeEntry::new("Quiet", "Nothing"));
        let path = project.add("Quiet", &[flags::WEAVER_ENABLED], Some(quiet));
        let before = fs::read(&path).unwrap();

        let mut orch = project.orchestrator();
        orch.compilation_started();
        orch.unit_compiled(path.clone());
        let report = completed(orch.compilation_finished(&mut project.host).unwrap());
        assert_eq!(report.unchanged, vec![path.clone()]);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_rule_failure_aborts_pass_without_writing() {
        let mut project = Project::new();
        let mut broken = networking_unit("Broken");
        // Dispose receiver loaded from a local that does not exist
        broken.types[0].methods[0].locals.clear();
        let first = project.add("Broken", &[flags::WEAVER_ENABLED], Some(broken));
        let second = project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));
        let before = fs::read(&first).unwrap();

        let mut orch = project.orchestrator();
        orch.compilation_started();
        orch.unit_compiled(first.clone());
        orch.unit_compiled(second.clone());
        let err = orch.compilation_finished(&mut project.host).unwrap_err();

        assert!(matches!(err, Error::Weaver { .. }));
        assert!(err.is_rewrite_error());
        assert_eq!(fs::read(&first).unwrap(), before);
        assert_eq!(CompiledUnit::read(&second).unwrap(), networking_unit("Game"));
        assert_eq!(orch.phase(), Phase::Idle);
    }

    #[test]
    fn test_no_weavers_skips() {
        let mut project = Project::new();
        project.add("Game", &[flags::WEAVER_ENABLED], Some(networking_unit("Game")));
        let mut orch = Orchestrator::new(
            WeaverRegistry::empty(),
            OrchestratorConfig {
                weaver_unit: DEFAULT_WEAVER_UNIT.to_string(),
                settings_path: project.dir.path().join("WeaverSettings.json"),
            },
        );
        orch.compilation_started();
        assert_eq!(
            orch.compilation_finished(&mut project.host).unwrap(),
            PassOutcome::Skipped(PassSkip::NoWeavers)
        );
    }

    #[test]
    fn test_reference_search_paths() {
        let units = vec![
            UnitDescriptor {
                name: "Game".to_string(),
                output_path: PathBuf::from("Library/Game.json"),
                defines: Default::default(),
                unit_references: vec!["Core".to_string(), "Nowhere".to_string()],
                precompiled_references: vec![PathBuf::from("Plugins/Vendor.json"), PathBuf::from("/")],
                editor_only: false,
            },
            UnitDescriptor {
                name: "Core".to_string(),
                output_path: PathBuf::from("Library/Core.json"),
                defines: Default::default(),
                unit_references: Vec::new(),
                precompiled_references: vec![PathBuf::from("Plugins/Other.json")],
                editor_only: false,
            },
        ];
        let resolver = build_resolver(&units);
        assert_eq!(
            resolver.search_paths(),
            &[PathBuf::from("Library"), PathBuf::from("Plugins")]
        );
    }

    #[test]
    fn test_registry_seeds_reach_type_flow() {
        // The registry's platform types are what make IDisposable a supertype
        let weaver = crate::weaver::NetworkCaptureWeaver::default();
        let mut hierarchy = TypeHierarchy::new();
        weaver.seed_types(&mut hierarchy);
        assert!(hierarchy.is_strict_supertype_of(IDISPOSABLE, UNITY_WEB_REQUEST));
    }
}
