//! VPS provisioning and lifecycle engine for lxforge.
//!
//! This crate ties the credit ledger and VPS registry (`lxforge-store`) to
//! the container process gateway (`lxforge-runtime`) and exposes the three
//! provisioning transactions (Purchase, Grant, Teardown) plus lifecycle
//! control and plan catalog management behind the [`ProvisioningEngine`]
//! trait.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lxforge_core::UserId;
//! use lxforge_engine::{
//!     EngineConfig, EngineService, PlanCatalog, ProvisioningEngine, RuntimeGateway,
//! };
//! use lxforge_runtime::{detect_runtime, RuntimeConfig};
//! use lxforge_store::RocksStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime_config = RuntimeConfig::default();
//! let runtime = detect_runtime(&runtime_config)?;
//! let engine = EngineService::new(
//!     Arc::new(RocksStore::open("/var/lib/lxforge/db")?),
//!     RuntimeGateway::new(runtime, runtime_config),
//!     Arc::new(PlanCatalog::load("/var/lib/lxforge/plans.json")?),
//!     EngineConfig::default(),
//! );
//!
//! engine.add_credits(UserId::new(42), 10)?;
//! let vps = engine.purchase(UserId::new(42), "small").await?;
//! println!("launched {}", vps.container_name);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod commands;
pub mod error;
pub mod lifecycle;
pub mod naming;
pub mod provision;
pub mod service;
pub mod types;

#[cfg(test)]
mod test_util;

pub use catalog::{CatalogError, Plan, PlanCatalog};
pub use commands::RuntimeGateway;
pub use error::{EngineError, Result};
pub use service::{EngineService, ProvisioningEngine};
pub use types::{ActionReport, EngineConfig, LifecycleAction, Provisioned, TornDown};
