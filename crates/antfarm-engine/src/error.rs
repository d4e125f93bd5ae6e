//! Error types for the Antfarm binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and shutdown.

/// Top-level error for the Antfarm binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Command-line arguments were malformed.
    #[error("usage error: {message}")]
    Usage {
        /// What was wrong.
        message: String,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: antfarm_core::ConfigError,
    },

    /// Ecosystem construction, seeding, or snapshot handling failed.
    #[error("ecosystem error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: antfarm_agents::AgentError,
    },

    /// The game loop ended with an error.
    #[error("driver error: {source}")]
    Driver {
        /// The underlying driver error.
        #[from]
        source: antfarm_core::DriverError,
    },

    /// Reading or writing a snapshot file failed.
    #[error("snapshot I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The loop thread panicked or was cancelled.
    #[error("loop thread failed: {message}")]
    LoopThread {
        /// Description of the failure.
        message: String,
    },
}
