//! Command results and gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Exit code sentinel reported when a command exceeds its deadline.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// The captured result of one runtime invocation.
///
/// Both real and simulated gateways return this shape; callers cannot
/// distinguish modes except by content.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code. [`TIMEOUT_EXIT_CODE`] on deadline expiry.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// The distinguished result for a command that exceeded its deadline.
    #[must_use]
    pub fn for_timeout() -> Self {
        Self {
            exit_code: TIMEOUT_EXIT_CODE,
            stdout: String::new(),
            stderr: "timeout".to_string(),
        }
    }

    /// Whether the command exited successfully.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Whether this result is the timeout sentinel.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.exit_code == TIMEOUT_EXIT_CODE && self.stderr == "timeout"
    }

    /// The most useful diagnostic text for a failed command: stderr if
    /// present, stdout otherwise.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Configuration for locating and invoking the container runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Candidate paths for the runtime binary, probed in order.
    #[serde(default = "RuntimeConfig::default_binary_paths")]
    pub binary_paths: Vec<PathBuf>,

    /// Binary name to look up on `$PATH` if no candidate path exists.
    #[serde(default = "RuntimeConfig::default_binary_name")]
    pub binary_name: String,

    /// Image launched for new containers.
    #[serde(default = "RuntimeConfig::default_image")]
    pub default_image: String,

    /// Profile applied to new containers.
    #[serde(default = "RuntimeConfig::default_profile")]
    pub default_profile: String,

    /// Fall back to the simulated gateway when no binary is found.
    #[serde(default = "RuntimeConfig::default_simulate")]
    pub simulate_if_missing: bool,

    /// Deadline for each runtime invocation, in seconds.
    #[serde(default = "RuntimeConfig::default_command_timeout")]
    pub command_timeout_seconds: u64,
}

impl RuntimeConfig {
    fn default_binary_paths() -> Vec<PathBuf> {
        vec![PathBuf::from("/usr/bin/lxc"), PathBuf::from("/snap/bin/lxc")]
    }

    fn default_binary_name() -> String {
        "lxc".to_string()
    }

    fn default_image() -> String {
        "images:ubuntu/22.04".to_string()
    }

    fn default_profile() -> String {
        "default".to_string()
    }

    const fn default_simulate() -> bool {
        true
    }

    const fn default_command_timeout() -> u64 {
        300
    }

    /// Get the per-command deadline as a `Duration`.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary_paths: Self::default_binary_paths(),
            binary_name: Self::default_binary_name(),
            default_image: Self::default_image(),
            default_profile: Self::default_profile(),
            simulate_if_missing: Self::default_simulate(),
            command_timeout_seconds: Self::default_command_timeout(),
        }
    }
}
