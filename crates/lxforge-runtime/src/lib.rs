//! Process gateway to the container runtime for lxforge.
//!
//! This crate is the only place that talks to the external container
//! runtime. It exposes a single operation, "run this command with this
//! deadline", behind the [`ContainerRuntime`] trait, with two
//! implementations:
//!
//! - [`LxcRuntime`]: spawns the real runtime binary, captures both output
//!   streams, and enforces the deadline (killing the child on expiry)
//! - [`SimulatedRuntime`]: fabricates success for hosts without a runtime,
//!   returning the same result shape so callers stay mode-agnostic
//!
//! Non-zero exit codes are reported in [`CommandOutput`], never thrown;
//! only spawn-level failures surface as [`RuntimeError`]. The gateway owns
//! no persistent state and never retries.
//!
//! # Example
//!
//! ```no_run
//! use lxforge_runtime::{detect_runtime, RuntimeConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RuntimeConfig::default();
//! let runtime = detect_runtime(&config)?;
//!
//! let args = vec!["info".to_string(), "mybox".to_string()];
//! let output = runtime.execute(&args, config.command_timeout()).await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod lxc;
pub mod simulated;
pub mod types;

pub use error::{Result, RuntimeError};
pub use lxc::{find_binary, LxcRuntime};
pub use simulated::SimulatedRuntime;
pub use types::{CommandOutput, RuntimeConfig, TIMEOUT_EXIT_CODE};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

/// The process gateway contract: run one external command with a deadline.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Execute the runtime binary with the given arguments.
    ///
    /// Returns the captured exit code and both output streams. A command
    /// that exceeds `timeout` is killed and reported with the timeout
    /// sentinel (see [`CommandOutput::is_timeout`]).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Spawn`] only when the binary cannot be
    /// invoked at all.
    async fn execute(&self, args: &[String], timeout: Duration) -> Result<CommandOutput>;
}

/// Select a gateway implementation for this host.
///
/// Probes the configured candidate paths and `$PATH` for the runtime
/// binary. When none is found, falls back to [`SimulatedRuntime`] if
/// `simulate_if_missing` is set.
///
/// # Errors
///
/// Returns [`RuntimeError::BinaryNotFound`] when no binary exists and
/// simulation is disabled.
pub fn detect_runtime(config: &RuntimeConfig) -> Result<Arc<dyn ContainerRuntime>> {
    if let Some(binary) = find_binary(config) {
        info!(binary = %binary.display(), "using real container runtime");
        return Ok(Arc::new(LxcRuntime::new(binary)));
    }

    if config.simulate_if_missing {
        warn!("container runtime not found, running in simulated mode");
        return Ok(Arc::new(SimulatedRuntime::new()));
    }

    Err(RuntimeError::BinaryNotFound)
}
