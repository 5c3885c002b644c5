//! Scripted process gateway for workflow tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lxforge_runtime::{CommandOutput, ContainerRuntime, Result};
use parking_lot::Mutex;

/// Hook invoked on every scripted call, used to inject side effects
/// (e.g., draining an account mid-transaction to force a debit race).
type CallHook = Box<dyn Fn() + Send + Sync>;

/// A gateway double that records every invocation and replays scripted
/// outputs, defaulting to success once the script runs out. Never spawns a
/// real process.
#[derive(Default)]
pub(crate) struct ScriptedRuntime {
    calls: Mutex<Vec<Vec<String>>>,
    script: Mutex<VecDeque<CommandOutput>>,
    hook: Mutex<Option<CallHook>>,
}

impl ScriptedRuntime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the next output to replay.
    pub(crate) fn push(&self, output: CommandOutput) {
        self.script.lock().push_back(output);
    }

    /// Install a hook that runs on every call.
    pub(crate) fn on_call(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }

    /// All recorded argument vectors, in call order.
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    pub(crate) fn success(stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub(crate) fn failure(stderr: &str) -> CommandOutput {
        CommandOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn execute(&self, args: &[String], _timeout: Duration) -> Result<CommandOutput> {
        self.calls.lock().push(args.to_vec());
        if let Some(hook) = self.hook.lock().as_ref() {
            hook();
        }
        let scripted = self.script.lock().pop_front();
        Ok(scripted.unwrap_or_else(|| Self::success("(scripted)")))
    }
}

/// Convenience alias used across workflow tests.
pub(crate) fn scripted() -> Arc<ScriptedRuntime> {
    Arc::new(ScriptedRuntime::new())
}
