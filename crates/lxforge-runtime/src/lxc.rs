//! Real process gateway: spawns the LXC binary as a child process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, RuntimeError};
use crate::types::{CommandOutput, RuntimeConfig};
use crate::ContainerRuntime;

/// Gateway that invokes a real container runtime binary.
///
/// Each call spawns one child process with both streams captured and a hard
/// deadline. A child that outlives the deadline is killed and reported with
/// the timeout sentinel. The gateway performs no retries; retry policy
/// belongs to the caller.
pub struct LxcRuntime {
    binary: PathBuf,
}

impl LxcRuntime {
    /// Create a gateway around the given runtime binary.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The binary this gateway invokes.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl ContainerRuntime for LxcRuntime {
    async fn execute(&self, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        debug!(binary = %self.binary.display(), ?args, "invoking runtime");

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must not leave the child
            // running.
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RuntimeError::Spawn {
                command: format!("{} {}", self.binary.display(), args.join(" ")),
                source,
            })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => {
                let output = result.map_err(|source| RuntimeError::Spawn {
                    command: format!("{} {}", self.binary.display(), args.join(" ")),
                    source,
                })?;
                Ok(CommandOutput {
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Err(_) => Ok(CommandOutput::for_timeout()),
        }
    }
}

/// Locate the runtime binary: configured candidate paths first, then `$PATH`.
#[must_use]
pub fn find_binary(config: &RuntimeConfig) -> Option<PathBuf> {
    for candidate in &config.binary_paths {
        if candidate.exists() {
            return Some(candidate.clone());
        }
    }

    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(&config.binary_name);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}
