//! Request, outcome, and configuration types for the engine.
//!
//! The external command dispatcher supplies already-parsed, already-
//! authorized requests built from these types and renders the outcomes as
//! chat messages.

use lxforge_core::VpsId;
use serde::{Deserialize, Serialize};

/// A lifecycle action applied to an existing VPS.
///
/// Each action translates 1:1 into a single runtime invocation; `Info`
/// maps to the runtime's inspect command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    /// Start the container.
    Start,
    /// Stop the container.
    Stop,
    /// Restart the container.
    Restart,
    /// Inspect the container without changing it.
    Info,
}

impl LifecycleAction {
    /// The runtime subcommand for this action.
    #[must_use]
    pub const fn as_arg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Outcome of a successful Purchase or Grant transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provisioned {
    /// The id of the new registry record.
    pub vps_id: VpsId,
    /// The launched container's name.
    pub container_name: String,
    /// The actor's balance after the debit. `None` for grants, and for the
    /// purchase race where the debit failed after launch (the container is
    /// kept, uncharged).
    pub new_balance: Option<u64>,
}

/// Outcome of a successful Teardown transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TornDown {
    /// The removed record's id.
    pub vps_id: VpsId,
    /// The deleted container's name.
    pub container_name: String,
}

/// Outcome of a successful lifecycle action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    /// The action that was applied.
    pub action: LifecycleAction,
    /// The container it was applied to.
    pub container_name: String,
    /// Raw captured runtime output. Truncation for display is the
    /// caller's concern.
    pub output: String,
}

/// Configuration for the provisioning engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Architecture label recorded on new VPS records.
    #[serde(default = "EngineConfig::default_arch")]
    pub default_arch: String,
}

impl EngineConfig {
    fn default_arch() -> String {
        "intel".to_string()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_arch: Self::default_arch(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_args() {
        assert_eq!(LifecycleAction::Start.as_arg(), "start");
        assert_eq!(LifecycleAction::Info.as_arg(), "info");
    }

    #[test]
    fn action_serde_is_lowercase() {
        let json = serde_json::to_string(&LifecycleAction::Restart).unwrap();
        assert_eq!(json, "\"restart\"");
        let parsed: LifecycleAction = serde_json::from_str("\"stop\"").unwrap();
        assert_eq!(parsed, LifecycleAction::Stop);
    }

    #[test]
    fn engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_arch, "intel");
    }
}
