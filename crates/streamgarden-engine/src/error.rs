//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure that can stop startup so `main` can
//! propagate with `?`. Nothing after startup is fatal.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: streamgarden_core::config::ConfigError,
    },

    /// The guardian database could not be reached or migrated.
    #[error("guardian store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: streamgarden_store::StoreError,
    },

    /// The overlay server could not be started.
    #[error("overlay error: {source}")]
    Overlay {
        /// The underlying startup error.
        #[from]
        source: streamgarden_overlay::StartupError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
