//! callweave
//!
//! Weaves network capture wrappers into compiled units after a build.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::process;

use callweave::ir::{printer::print_unit, CompiledUnit};
use callweave::pipeline::host::resolve;
use callweave::pipeline::{
    CompilationHost, ExclusionSettings, ManifestHost, Orchestrator, OrchestratorConfig,
    PassOutcome, ProjectManifest, DEFAULT_WEAVER_UNIT, SETTINGS_FILE_NAME,
};
use callweave::weaver::WeaverRegistry;

/// Exit code when the pass asked the build system for a full rebuild
const EXIT_REBUILD: i32 = 3;

/// callweave
#[derive(Parser, Debug)]
#[command(name = "callweave")]
#[command(version = "0.1.0")]
#[command(about = "Post-build weaver that routes network calls through capture wrappers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one weaving pass over a project
    Weave {
        /// Project manifest (.json)
        manifest: PathBuf,

        /// Units the compiler just rebuilt; all units when omitted
        #[arg(short, long, value_name = "PATH")]
        dirty: Vec<PathBuf>,

        /// Treat this compile as a release build
        #[arg(long)]
        release: bool,

        /// Exclusion settings file
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Name of the unit the weaver itself lives in
        #[arg(long, default_value = DEFAULT_WEAVER_UNIT)]
        weaver_unit: String,
    },
    /// Print a compiled unit in readable form
    Dump {
        /// Compiled unit (.json)
        unit: PathBuf,
    },
    /// Inspect or reset the exclusion settings
    Settings {
        /// Project manifest (.json)
        manifest: PathBuf,

        /// Exclusion settings file
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the effective exclude list
    Show,
    /// Restore the default exclude list and save it
    Reset,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Weave {
            manifest,
            dirty,
            release,
            settings,
            weaver_unit,
        } => weave(manifest, dirty, *release, settings.as_deref(), weaver_unit),
        Commands::Dump { unit } => {
            let unit = CompiledUnit::read(unit)
                .with_context(|| format!("Failed to load unit {}", unit.display()))?;
            print!("{}", print_unit(&unit));
            Ok(0)
        }
        Commands::Settings {
            manifest,
            settings,
            action,
        } => edit_settings(manifest, settings.as_deref(), action),
        Commands::Version => {
            println!("callweave 0.1.0");
            Ok(0)
        }
    }
}

fn load_manifest(path: &Path) -> Result<ProjectManifest> {
    ProjectManifest::load(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))
}

/// Explicit path, then the manifest's own setting, then the default file next to it
fn settings_path(manifest_path: &Path, manifest: &ProjectManifest, explicit: Option<&Path>) -> PathBuf {
    let base = manifest_path.parent().unwrap_or(Path::new("."));
    explicit
        .map(Path::to_path_buf)
        .or_else(|| manifest.settings_path.clone())
        .unwrap_or_else(|| base.join(SETTINGS_FILE_NAME))
}

fn weave(
    manifest_path: &Path,
    dirty: &[PathBuf],
    release: bool,
    settings: Option<&Path>,
    weaver_unit: &str,
) -> Result<i32> {
    let manifest = load_manifest(manifest_path)?;
    let base = manifest_path.parent().unwrap_or(Path::new("."));

    let config = OrchestratorConfig {
        weaver_unit: weaver_unit.to_string(),
        settings_path: settings_path(manifest_path, &manifest, settings),
    };
    let registry = WeaverRegistry::new(&manifest.capture);
    let mut orchestrator = Orchestrator::new(registry, config);

    let mut host = ManifestHost::new(manifest);
    if release {
        host.set_release_build(true);
    }

    orchestrator.compilation_started();
    for path in dirty {
        orchestrator.unit_compiled(resolve(base, path));
    }
    let outcome = orchestrator
        .compilation_finished(&mut host)
        .context("Weaving pass failed")?;

    match outcome {
        PassOutcome::Completed(report) => {
            info!(
                "Weaving done: {} written, {} unchanged, {} skipped",
                report.written.len(),
                report.unchanged.len(),
                report.skipped.len()
            );
            Ok(0)
        }
        PassOutcome::RebuildRequested(reason) => {
            info!("Full rebuild requested ({:?})", reason);
            Ok(EXIT_REBUILD)
        }
        PassOutcome::Skipped(reason) => {
            info!("Weaving pass skipped ({:?})", reason);
            Ok(0)
        }
    }
}

fn edit_settings(manifest_path: &Path, settings: Option<&Path>, action: &SettingsAction) -> Result<i32> {
    let manifest = load_manifest(manifest_path)?;
    let path = settings_path(manifest_path, &manifest, settings);
    let host = ManifestHost::new(manifest);
    let units = host.units();

    let mut current = ExclusionSettings::load(&path, &units);
    if let SettingsAction::Reset = action {
        current.reset(&units);
        current
            .save(&path)
            .with_context(|| format!("Failed to save settings {}", path.display()))?;
        info!("Reset exclusion settings at {}", path.display());
    }

    for name in &current.excluded_units {
        println!("{}", name);
    }
    Ok(0)
}
