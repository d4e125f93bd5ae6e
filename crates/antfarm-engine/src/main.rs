//! Antfarm binary.
//!
//! Wires configuration, the ecosystem, the terminal renderer, and the game
//! loop together, then runs the loop on a dedicated blocking thread until a
//! bound is hit, every bug is gone, or Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Parse arguments and load configuration from `antfarm-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Seed a fresh population or restore a snapshot
//! 4. Create shared control state and the Ctrl-C handler
//! 5. Run the driver on its own thread
//! 6. Log the result and optionally save a snapshot

mod args;
mod error;
mod terminal;
mod watcher;

use std::path::Path;
use std::sync::Arc;

use antfarm_agents::{Ecosystem, Snapshot};
use antfarm_core::config::LoggingConfig;
use antfarm_core::{
    MonotonicClock, RenderSink, SimulationConfig, SimulationControl, TimeSource, standard_driver,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::EngineArgs;
use crate::error::EngineError;
use crate::terminal::{NullRenderer, TerminalRenderer};
use crate::watcher::PopulationWatcher;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Parse arguments and load configuration.
    let args = EngineArgs::parse(std::env::args().skip(1))?;
    let config_path = args.config_path(std::env::var("ANTFARM_CONFIG").ok());
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging. Logs go to stderr; frames own stdout.
    init_tracing(&config.logging);
    info!("antfarm-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        width = config.grid.width,
        height = config.grid.height,
        seed = config.grid.seed,
        movement_fps = config.phases.movement_fps,
        render_fps = config.phases.render_fps,
        target_fps = config.phases.target_fps,
        "Simulation parameters"
    );

    // 3. Seed or restore the ecosystem.
    let watcher = PopulationWatcher::new();
    let mut eco = build_ecosystem(&args, &config, &watcher)?;

    // 4. Control state and Ctrl-C.
    let control = Arc::new(SimulationControl::new(&config.simulation));
    let stopper = Arc::clone(&control);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping after the current frame");
                stopper.request_stop();
            }
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    // 5. Run the driver on a dedicated thread.
    let sink: Box<dyn RenderSink> = if args.quiet {
        Box::new(NullRenderer)
    } else if args.no_clear {
        Box::new(TerminalRenderer::plain(std::io::stdout()))
    } else {
        Box::new(TerminalRenderer::new(std::io::stdout()))
    };
    let clock: Arc<dyn TimeSource> = Arc::new(MonotonicClock::new());
    let mut driver = standard_driver(&config.phases, Arc::clone(&control), clock, sink);
    let (result, eco) = tokio::task::spawn_blocking(move || {
        let result = driver.run(&mut eco);
        (result, eco)
    })
    .await
    .map_err(|e| EngineError::LoopThread {
        message: e.to_string(),
    })?;
    let summary = result.map_err(EngineError::from)?;

    // 6. Log results.
    let census = eco.census();
    let totals = watcher.totals();
    info!(
        end_reason = %summary.end_reason,
        frames = summary.frames,
        elapsed = ?summary.elapsed,
        movement_pulses = census.frame,
        ants = census.ants,
        doodlebugs = census.doodlebugs,
        births = census.births,
        eaten = census.meals,
        starved = census.starvations,
        bred = ?totals.bred,
        deaths = ?totals.deaths,
        "Simulation ended"
    );

    if let Some(path) = &args.save {
        save_snapshot(&eco, path)?;
    }

    info!("antfarm-engine shutdown complete");
    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load configuration from `path`, or defaults if it does not exist.
///
/// Returns whether the file was found.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, false))
    }
}

/// Restore a snapshot if `--restore` was given, otherwise seed a fresh
/// population. The watcher is attached either way.
fn build_ecosystem(
    args: &EngineArgs,
    config: &SimulationConfig,
    watcher: &PopulationWatcher,
) -> Result<Ecosystem, EngineError> {
    if let Some(path) = &args.restore {
        let text = std::fs::read_to_string(path)?;
        let snapshot = Snapshot::from_json(&text)?;
        let mut eco = Ecosystem::restore(&snapshot, config.species.clone(), config.grid.seed)?;
        let _subscriptions = watcher.attach(&mut eco);
        watcher.sync(&eco);
        info!(path = %path.display(), bugs = eco.len(), "Snapshot restored");
        return Ok(eco);
    }

    let mut eco = Ecosystem::new(
        config.grid.width,
        config.grid.height,
        config.species.clone(),
        config.grid.seed,
    )?;
    let _subscriptions = watcher.attach(&mut eco);
    let ants = usize::try_from(config.population.initial_ants).unwrap_or(usize::MAX);
    let doodlebugs = usize::try_from(config.population.initial_doodlebugs).unwrap_or(usize::MAX);
    eco.populate(ants, doodlebugs)?;
    info!(ants, doodlebugs, "Initial population placed");
    Ok(eco)
}

/// Write `eco` to `path` as a JSON snapshot.
fn save_snapshot(eco: &Ecosystem, path: &Path) -> Result<(), EngineError> {
    let snapshot = eco.snapshot();
    std::fs::write(path, snapshot.to_json()?)?;
    info!(path = %path.display(), bugs = snapshot.bugs.len(), "Snapshot saved");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use antfarm_types::Species;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "antfarm-{name}-{}-{}.json",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    #[test]
    fn fresh_population_matches_config() {
        let config = SimulationConfig::default();
        let watcher = PopulationWatcher::new();
        let eco = build_ecosystem(&EngineArgs::default(), &config, &watcher).unwrap();
        assert_eq!(eco.count(Species::Ant), 100);
        assert_eq!(eco.count(Species::Doodlebug), 5);
        assert_eq!(watcher.totals().live.get(&Species::Ant), Some(&100));
    }

    #[test]
    fn save_then_restore() {
        let mut config = SimulationConfig::default();
        config.grid.width = 6;
        config.grid.height = 4;
        config.population.initial_ants = 7;
        config.population.initial_doodlebugs = 2;
        let watcher = PopulationWatcher::new();
        let original = build_ecosystem(&EngineArgs::default(), &config, &watcher).unwrap();

        let path = temp_path("roundtrip");
        save_snapshot(&original, &path).unwrap();

        let args = EngineArgs {
            restore: Some(path.clone()),
            ..EngineArgs::default()
        };
        let restored = build_ecosystem(&args, &config, &PopulationWatcher::new()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(restored.snapshot().bugs, original.snapshot().bugs);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let (config, found) = load_config(Path::new("/nonexistent/antfarm.yaml")).unwrap();
        assert!(!found);
        assert_eq!(config.grid.width, SimulationConfig::default().grid.width);
    }

    #[test]
    fn missing_snapshot_is_an_io_error() {
        let args = EngineArgs {
            restore: Some(temp_path("absent")),
            ..EngineArgs::default()
        };
        let err = build_ecosystem(&args, &SimulationConfig::default(), &PopulationWatcher::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
