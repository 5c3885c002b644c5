//! Container-level command sequences over the process gateway.
//!
//! This module translates domain operations (launch this container, delete
//! that one) into the argument vectors the runtime binary expects. It is the
//! only place that knows the runtime's command syntax; the workflows above
//! it reason in terms of [`CommandOutput`] results.

use std::sync::Arc;

use lxforge_runtime::{CommandOutput, ContainerRuntime, Result, RuntimeConfig};
use tracing::warn;

use crate::types::LifecycleAction;

/// The engine's handle on the process gateway.
///
/// Mode-agnostic: the underlying runtime may be real or simulated.
pub struct RuntimeGateway {
    runtime: Arc<dyn ContainerRuntime>,
    config: RuntimeConfig,
}

impl RuntimeGateway {
    /// Wrap a runtime with its invocation configuration.
    #[must_use]
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: RuntimeConfig) -> Self {
        Self { runtime, config }
    }

    async fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        self.runtime
            .execute(&args, self.config.command_timeout())
            .await
    }

    /// Launch a container with the configured image and profile, then apply
    /// RAM and CPU limits.
    ///
    /// The two limit-setting calls are best-effort: a failure there leaves
    /// the container running with default limits and is only logged. The
    /// returned output is the launch step's.
    ///
    /// # Errors
    ///
    /// Returns an error only if the runtime binary cannot be spawned.
    pub async fn launch(&self, name: &str, ram_mb: u32, cpu_cores: u32) -> Result<CommandOutput> {
        let launch = self
            .run(vec![
                "launch".to_string(),
                self.config.default_image.clone(),
                name.to_string(),
                "-p".to_string(),
                self.config.default_profile.clone(),
            ])
            .await?;

        if !launch.success() {
            return Ok(launch);
        }

        let memory_bytes = u64::from(ram_mb) * 1024 * 1024;
        let limits = [
            ("limits.memory", memory_bytes.to_string()),
            ("limits.cpu", cpu_cores.to_string()),
        ];
        for (key, value) in limits {
            let result = self
                .run(vec![
                    "config".to_string(),
                    "set".to_string(),
                    name.to_string(),
                    key.to_string(),
                    value,
                ])
                .await;
            match result {
                Ok(output) if !output.success() => {
                    warn!(container = name, limit = key, diagnostic = output.diagnostic(),
                        "failed to apply container limit");
                }
                Err(err) => {
                    warn!(container = name, limit = key, error = %err,
                        "failed to apply container limit");
                }
                Ok(_) => {}
            }
        }

        Ok(launch)
    }

    /// Force-stop a container. Callers treat this as best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error only if the runtime binary cannot be spawned.
    pub async fn stop_force(&self, name: &str) -> Result<CommandOutput> {
        self.run(vec![
            "stop".to_string(),
            name.to_string(),
            "--force".to_string(),
        ])
        .await
    }

    /// Delete a container.
    ///
    /// # Errors
    ///
    /// Returns an error only if the runtime binary cannot be spawned.
    pub async fn delete(&self, name: &str) -> Result<CommandOutput> {
        self.run(vec!["delete".to_string(), name.to_string()]).await
    }

    /// Apply a lifecycle action as a single runtime invocation.
    ///
    /// # Errors
    ///
    /// Returns an error only if the runtime binary cannot be spawned.
    pub async fn action(&self, name: &str, action: LifecycleAction) -> Result<CommandOutput> {
        self.run(vec![action.as_arg().to_string(), name.to_string()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::ScriptedRuntime;
    use lxforge_runtime::TIMEOUT_EXIT_CODE;

    fn gateway(runtime: Arc<ScriptedRuntime>) -> RuntimeGateway {
        RuntimeGateway::new(runtime, RuntimeConfig::default())
    }

    #[tokio::test]
    async fn launch_issues_launch_then_limits() {
        let runtime = Arc::new(ScriptedRuntime::new());
        let gw = gateway(Arc::clone(&runtime));

        let output = gw.launch("user1-small-240101000000", 1024, 2).await.unwrap();
        assert!(output.success());

        let calls = runtime.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0][0], "launch");
        assert_eq!(calls[0][2], "user1-small-240101000000");
        assert_eq!(calls[1][..2], ["config".to_string(), "set".to_string()]);
        assert_eq!(calls[1][3], "limits.memory");
        assert_eq!(calls[1][4], (1024u64 * 1024 * 1024).to_string());
        assert_eq!(calls[2][3], "limits.cpu");
        assert_eq!(calls[2][4], "2");
    }

    #[tokio::test]
    async fn failed_launch_skips_limit_calls() {
        let runtime = Arc::new(ScriptedRuntime::new());
        runtime.push(ScriptedRuntime::failure("no such image"));
        let gw = gateway(Arc::clone(&runtime));

        let output = gw.launch("box", 512, 1).await.unwrap();
        assert!(!output.success());
        assert_eq!(runtime.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_limit_call_does_not_fail_launch() {
        let runtime = Arc::new(ScriptedRuntime::new());
        runtime.push(ScriptedRuntime::success(""));
        runtime.push(ScriptedRuntime::failure("bad key"));
        let gw = gateway(Arc::clone(&runtime));

        let output = gw.launch("box", 512, 1).await.unwrap();
        assert!(output.success());
        assert_eq!(runtime.calls().len(), 3);
    }

    #[tokio::test]
    async fn stop_uses_force() {
        let runtime = Arc::new(ScriptedRuntime::new());
        let gw = gateway(Arc::clone(&runtime));

        gw.stop_force("box").await.unwrap();
        assert_eq!(
            runtime.calls()[0],
            vec!["stop".to_string(), "box".to_string(), "--force".to_string()]
        );
    }

    #[tokio::test]
    async fn action_maps_one_to_one() {
        let runtime = Arc::new(ScriptedRuntime::new());
        let gw = gateway(Arc::clone(&runtime));

        gw.action("box", LifecycleAction::Info).await.unwrap();
        assert_eq!(
            runtime.calls()[0],
            vec!["info".to_string(), "box".to_string()]
        );
    }

    #[tokio::test]
    async fn timeout_sentinel_passes_through() {
        let runtime = Arc::new(ScriptedRuntime::new());
        runtime.push(CommandOutput::for_timeout());
        let gw = gateway(Arc::clone(&runtime));

        let output = gw.delete("box").await.unwrap();
        assert_eq!(output.exit_code, TIMEOUT_EXIT_CODE);
        assert!(output.is_timeout());
    }
}
