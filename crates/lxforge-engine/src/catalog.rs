//! Plan catalog: the static mapping from plan key to sizing and price.
//!
//! The catalog is persisted as an externally-editable JSON file using the
//! same on-disk shape as the original `plans.json`. The engine only reads
//! it during a transaction; a snapshot taken at transaction start stays
//! valid even if an admin edits the file concurrently. Edits apply to
//! subsequent transactions after an explicit [`PlanCatalog::reload`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors that can occur loading or editing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read or written.
    #[error("catalog file error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An edit targeted a plan that does not exist.
    #[error("no such plan: {0}")]
    NoSuchPlan(String),
}

/// The on-disk shape of one plan, field names matching the legacy file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlanSpec {
    #[serde(rename = "name")]
    display_name: String,
    ram_mb: u32,
    #[serde(rename = "cpu")]
    cpu_cores: u32,
    disk_gb: u32,
    price: u64,
}

/// A resolved plan: a named bundle of sizing and credit price.
///
/// Immutable during a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Unique catalog key.
    pub key: String,
    /// Human-readable name.
    pub display_name: String,
    /// RAM allocation in megabytes.
    pub ram_mb: u32,
    /// CPU core count.
    pub cpu_cores: u32,
    /// Disk allocation in gigabytes, stored as metadata only.
    pub disk_gb: u32,
    /// Price in credits.
    pub price: u64,
}

/// File-backed plan catalog with explicit reload semantics.
pub struct PlanCatalog {
    path: PathBuf,
    plans: RwLock<BTreeMap<String, PlanSpec>>,
}

impl PlanCatalog {
    /// Load the catalog from a JSON file, creating it with the default
    /// plans if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, written, or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let defaults = default_plans();
            std::fs::write(&path, serde_json::to_string_pretty(&defaults)?)?;
            info!(path = %path.display(), "wrote default plan catalog");
        }

        let data = std::fs::read_to_string(&path)?;
        let plans: BTreeMap<String, PlanSpec> = serde_json::from_str(&data)?;
        info!(path = %path.display(), plans = plans.len(), "loaded plan catalog");

        Ok(Self {
            path,
            plans: RwLock::new(plans),
        })
    }

    /// Re-read the catalog file so admin edits apply to subsequent
    /// transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed; the previous
    /// snapshot stays in effect on failure.
    pub fn reload(&self) -> Result<(), CatalogError> {
        let data = std::fs::read_to_string(&self.path)?;
        let plans: BTreeMap<String, PlanSpec> = serde_json::from_str(&data)?;
        *self.plans.write() = plans;
        Ok(())
    }

    /// Look up a plan by key, returning a snapshot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Plan> {
        let plans = self.plans.read();
        plans.get(key).map(|spec| resolve(key, spec))
    }

    /// List all plans in key order.
    #[must_use]
    pub fn list(&self) -> Vec<Plan> {
        let plans = self.plans.read();
        plans.iter().map(|(key, spec)| resolve(key, spec)).collect()
    }

    /// Edit an existing plan's sizing (and optionally price), persisting
    /// the change to the catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoSuchPlan` if the key does not exist, or an
    /// I/O error if the file cannot be written.
    pub fn update_plan(
        &self,
        key: &str,
        ram_mb: u32,
        cpu_cores: u32,
        disk_gb: u32,
        price: Option<u64>,
    ) -> Result<Plan, CatalogError> {
        let mut plans = self.plans.write();
        let spec = plans
            .get_mut(key)
            .ok_or_else(|| CatalogError::NoSuchPlan(key.to_string()))?;

        spec.ram_mb = ram_mb;
        spec.cpu_cores = cpu_cores;
        spec.disk_gb = disk_gb;
        if let Some(price) = price {
            spec.price = price;
        }

        let updated = resolve(key, spec);
        std::fs::write(&self.path, serde_json::to_string_pretty(&*plans)?)?;

        info!(plan = key, "updated plan catalog entry");
        Ok(updated)
    }
}

fn resolve(key: &str, spec: &PlanSpec) -> Plan {
    Plan {
        key: key.to_string(),
        display_name: spec.display_name.clone(),
        ram_mb: spec.ram_mb,
        cpu_cores: spec.cpu_cores,
        disk_gb: spec.disk_gb,
        price: spec.price,
    }
}

fn default_plans() -> BTreeMap<String, PlanSpec> {
    let mut plans = BTreeMap::new();
    plans.insert(
        "basic".to_string(),
        PlanSpec {
            display_name: "Basic".to_string(),
            ram_mb: 512,
            cpu_cores: 1,
            disk_gb: 10,
            price: 1,
        },
    );
    plans.insert(
        "small".to_string(),
        PlanSpec {
            display_name: "Small".to_string(),
            ram_mb: 1024,
            cpu_cores: 1,
            disk_gb: 20,
            price: 2,
        },
    );
    plans.insert(
        "medium".to_string(),
        PlanSpec {
            display_name: "Medium".to_string(),
            ram_mb: 2048,
            cpu_cores: 2,
            disk_gb: 40,
            price: 4,
        },
    );
    plans.insert(
        "large".to_string(),
        PlanSpec {
            display_name: "Large".to_string(),
            ram_mb: 4096,
            cpu_cores: 4,
            disk_gb: 80,
            price: 8,
        },
    );
    plans
}
