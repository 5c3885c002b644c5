//! Error types for the process gateway.

use thiserror::Error;

/// A result type using `RuntimeError`.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur when invoking the container runtime.
///
/// Non-zero exit codes are not errors; they are reported in-band as part of
/// [`crate::CommandOutput`]. Only failures to invoke the runtime at all
/// surface here.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime binary could not be spawned (missing, permission denied).
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        /// The command that could not be started.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No runtime binary was found and simulation is disabled.
    #[error("container runtime binary not found and simulation is disabled")]
    BinaryNotFound,
}
