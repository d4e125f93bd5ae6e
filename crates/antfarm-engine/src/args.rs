//! Command-line arguments.
//!
//! ```text
//! antfarm-engine [--config PATH] [--restore PATH] [--save PATH] [--quiet] [--no-clear]
//! ```
//!
//! `--config` falls back to `ANTFARM_CONFIG`, then `antfarm-config.yaml`.

use std::path::PathBuf;

use crate::error::EngineError;

/// Config file used when neither `--config` nor `ANTFARM_CONFIG` is given.
pub const DEFAULT_CONFIG: &str = "antfarm-config.yaml";

/// Parsed command-line arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineArgs {
    /// Explicit config path.
    pub config: Option<PathBuf>,
    /// Snapshot to restore instead of seeding a fresh population.
    pub restore: Option<PathBuf>,
    /// Where to write a snapshot when the run ends.
    pub save: Option<PathBuf>,
    /// Skip the terminal renderer.
    pub quiet: bool,
    /// Append frames instead of clearing the screen.
    pub no_clear: bool,
}

impl EngineArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--config" => parsed.config = Some(path_value(&flag, args.next())?),
                "--restore" => parsed.restore = Some(path_value(&flag, args.next())?),
                "--save" => parsed.save = Some(path_value(&flag, args.next())?),
                "--quiet" | "-q" => parsed.quiet = true,
                "--no-clear" => parsed.no_clear = true,
                other => {
                    return Err(EngineError::Usage {
                        message: format!("unknown argument '{other}'"),
                    });
                }
            }
        }
        Ok(parsed)
    }

    /// Resolve the config path: flag, then `env_override`, then the default.
    pub fn config_path(&self, env_override: Option<String>) -> PathBuf {
        self.config
            .clone()
            .or_else(|| env_override.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
    }
}

fn path_value(flag: &str, value: Option<String>) -> Result<PathBuf, EngineError> {
    match value {
        Some(v) if !v.starts_with("--") => Ok(PathBuf::from(v)),
        _ => Err(EngineError::Usage {
            message: format!("{flag} needs a path"),
        }),
    }
}
