//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and simulation execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: swarmgrid_core::config::ConfigError,
    },

    /// The initial world could not be built.
    #[error("initialization error: {source}")]
    Init {
        /// The underlying tick error.
        #[from]
        source: swarmgrid_core::tick::TickError,
    },

    /// The tick driver rejected its configuration.
    #[error("driver error: {source}")]
    Driver {
        /// The underlying driver error.
        #[from]
        source: swarmgrid_core::driver::DriverError,
    },

    /// A headless run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: swarmgrid_core::runner::RunnerError,
    },

    /// Observer API server failed to start or stopped with an error.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: swarmgrid_observer::ServerError,
    },
}
