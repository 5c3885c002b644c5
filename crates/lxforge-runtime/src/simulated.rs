//! Simulated process gateway for hosts without a container runtime.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::CommandOutput;
use crate::ContainerRuntime;

/// Artificial delay applied to every simulated invocation.
const SIMULATED_DELAY: Duration = Duration::from_millis(100);

/// Gateway that fabricates success without touching a real runtime.
///
/// Used when the runtime binary cannot be located and simulation is
/// permitted by configuration. Returns the same result shape as the real
/// gateway: exit code 0 with stdout echoing the intended command, after a
/// short delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedRuntime;

impl SimulatedRuntime {
    /// Create a simulated gateway.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContainerRuntime for SimulatedRuntime {
    async fn execute(&self, args: &[String], _timeout: Duration) -> Result<CommandOutput> {
        tokio::time::sleep(SIMULATED_DELAY).await;

        Ok(CommandOutput {
            exit_code: 0,
            stdout: format!("(simulated) {}", args.join(" ")),
            stderr: String::new(),
        })
    }
}
