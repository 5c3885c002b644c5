//! Domain types stored in the database.
//!
//! These types represent the persisted state of accounts and VPS records.

use chrono::{DateTime, Utc};
use lxforge_core::{UserId, VpsId};
use serde::{Deserialize, Serialize};

/// An account record holding a user's credit balance.
///
/// Accounts are created implicitly on first ledger touch and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account holder.
    pub user_id: UserId,
    /// Current credit balance. Never negative.
    pub credits: u64,
}

impl Account {
    /// A fresh account with a zero balance.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            credits: 0,
        }
    }
}

/// A VPS record stored in the registry.
///
/// A record exists iff a corresponding external container is believed to
/// exist. The record is authoritative for billing; `status` is advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpsRecord {
    /// Registry-allocated identifier.
    pub id: VpsId,
    /// The user this VPS was issued to.
    pub owner_id: UserId,
    /// Globally unique container name (see the engine's naming policy).
    pub container_name: String,
    /// The plan this VPS was provisioned from.
    pub plan_key: String,
    /// RAM sizing recorded at provisioning time, in megabytes.
    pub ram_mb: u32,
    /// CPU core count recorded at provisioning time.
    pub cpu_cores: u32,
    /// CPU architecture label.
    pub arch: String,
    /// Last explicitly set status.
    pub status: VpsStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// The fields needed to create a new VPS record.
///
/// The registry allocates the id and timestamps the record.
#[derive(Debug, Clone)]
pub struct NewVps {
    /// The user this VPS is issued to.
    pub owner_id: UserId,
    /// Container name generated by the naming policy.
    pub container_name: String,
    /// The plan being provisioned.
    pub plan_key: String,
    /// RAM sizing, in megabytes.
    pub ram_mb: u32,
    /// CPU core count.
    pub cpu_cores: u32,
    /// CPU architecture label.
    pub arch: String,
}

/// Status of a VPS record.
///
/// This is the last explicitly set value; it is never inferred from
/// free-text runtime output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VpsStatus {
    /// The container is believed to be running.
    Running,
    /// The container is believed to be stopped.
    Stopped,
    /// The container's state could not be determined.
    Unknown,
}
