//! Provisioning engine service implementation.
//!
//! This module provides the `ProvisioningEngine` trait and `EngineService`
//! implementation that coordinates the ledger, registry, plan catalog, and
//! process gateway.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lxforge_core::{UserId, VpsId};
use lxforge_store::{Store, VpsRecord};
use tracing::info;

use crate::catalog::{Plan, PlanCatalog};
use crate::commands::RuntimeGateway;
use crate::error::Result;
use crate::lifecycle;
use crate::provision;
use crate::types::{ActionReport, EngineConfig, LifecycleAction, Provisioned, TornDown};

/// Trait defining the provisioning engine operations.
///
/// This trait is the complete API the command dispatcher calls into.
/// Authorization (who may grant, who may tear down which VPS) happens in the
/// dispatcher; every method here trusts its caller.
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    // =========================================================================
    // Provisioning Transactions
    // =========================================================================

    /// Purchase a VPS: debit the actor's credits and launch a container.
    ///
    /// Plan keys are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownPlan` or `EngineError::InsufficientCredits`
    /// with no side effects, or a launch/storage error.
    async fn purchase(&self, actor: UserId, plan_key: &str) -> Result<Provisioned>;

    /// Grant a VPS to a user without touching the ledger.
    async fn grant(&self, target: UserId, plan_key: &str) -> Result<Provisioned>;

    /// Tear down a VPS: delete the container, then remove its record.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no record exists, or
    /// `EngineError::TeardownFailed` with the record retained if the delete
    /// step failed.
    async fn teardown(&self, vps_id: VpsId) -> Result<TornDown>;

    // =========================================================================
    // Lifecycle Operations
    // =========================================================================

    /// Apply a start/stop/restart/info action to a registered VPS.
    async fn lifecycle(&self, vps_id: VpsId, action: LifecycleAction) -> Result<ActionReport>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Return a user's credit balance.
    fn balance(&self, user_id: UserId) -> Result<u64>;

    /// Add credits to a user's balance, returning the new balance.
    fn add_credits(&self, user_id: UserId, amount: u64) -> Result<u64>;

    /// Remove credits, clamping at 0, returning the new balance.
    fn remove_credits(&self, user_id: UserId, amount: u64) -> Result<u64>;

    /// Reset a user's balance to 0.
    fn set_credits_zero(&self, user_id: UserId) -> Result<()>;

    // =========================================================================
    // Registry Queries
    // =========================================================================

    /// List the VPS records owned by a user.
    fn list_owned(&self, owner_id: UserId) -> Result<Vec<VpsRecord>>;

    /// List every VPS record in the registry.
    fn list_all(&self) -> Result<Vec<VpsRecord>>;

    /// Fetch a single VPS record.
    fn get_vps(&self, vps_id: VpsId) -> Result<Option<VpsRecord>>;

    // =========================================================================
    // Plan Catalog
    // =========================================================================

    /// List the available plans in key order.
    fn plans(&self) -> Vec<Plan>;

    /// Re-read the plan catalog file so external edits take effect.
    fn reload_plans(&self) -> Result<()>;

    /// Edit an existing plan's sizing and optionally its price.
    fn update_plan(
        &self,
        key: &str,
        ram_mb: u32,
        cpu_cores: u32,
        disk_gb: u32,
        price: Option<u64>,
    ) -> Result<Plan>;
}

/// The main provisioning engine implementation.
///
/// Teardown and lifecycle operations targeting the same VPS id are
/// serialized through a per-id async lock, so a teardown cannot interleave
/// with a restart of the same container. Operations on distinct ids run
/// concurrently.
pub struct EngineService<S: Store> {
    store: Arc<S>,
    gateway: RuntimeGateway,
    catalog: Arc<PlanCatalog>,
    config: EngineConfig,
    vps_locks: parking_lot::Mutex<HashMap<u64, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: Store> EngineService<S> {
    /// Create a new engine service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        gateway: RuntimeGateway,
        catalog: Arc<PlanCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            catalog,
            config,
            vps_locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    fn vps_lock(&self, vps_id: VpsId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.vps_locks.lock();
        Arc::clone(locks.entry(vps_id.as_u64()).or_default())
    }
}

#[async_trait]
impl<S: Store> ProvisioningEngine for EngineService<S> {
    async fn purchase(&self, actor: UserId, plan_key: &str) -> Result<Provisioned> {
        provision::purchase(
            &*self.store,
            &self.gateway,
            &self.catalog,
            &self.config.default_arch,
            actor,
            &plan_key.to_lowercase(),
        )
        .await
    }

    async fn grant(&self, target: UserId, plan_key: &str) -> Result<Provisioned> {
        provision::grant(
            &*self.store,
            &self.gateway,
            &self.catalog,
            &self.config.default_arch,
            target,
            &plan_key.to_lowercase(),
        )
        .await
    }

    async fn teardown(&self, vps_id: VpsId) -> Result<TornDown> {
        let lock = self.vps_lock(vps_id);
        let guard = lock.lock().await;
        let result = provision::teardown(&*self.store, &self.gateway, vps_id).await;
        if result.is_ok() {
            // The record is gone and ids are never reused, so the lock entry
            // can be reclaimed. Waiters already holding the old handle just
            // see NotFound.
            drop(guard);
            self.vps_locks.lock().remove(&vps_id.as_u64());
        }
        result
    }

    async fn lifecycle(&self, vps_id: VpsId, action: LifecycleAction) -> Result<ActionReport> {
        let lock = self.vps_lock(vps_id);
        let _guard = lock.lock().await;
        lifecycle::apply(&*self.store, &self.gateway, vps_id, action).await
    }

    fn balance(&self, user_id: UserId) -> Result<u64> {
        Ok(self.store.balance(user_id)?)
    }

    fn add_credits(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let new_balance = self.store.add_credits(user_id, amount)?;
        info!(user = %user_id, amount, new_balance, "added credits");
        Ok(new_balance)
    }

    fn remove_credits(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let new_balance = self.store.remove_credits(user_id, amount)?;
        info!(user = %user_id, amount, new_balance, "removed credits");
        Ok(new_balance)
    }

    fn set_credits_zero(&self, user_id: UserId) -> Result<()> {
        self.store.set_credits_zero(user_id)?;
        info!(user = %user_id, "reset credits to zero");
        Ok(())
    }

    fn list_owned(&self, owner_id: UserId) -> Result<Vec<VpsRecord>> {
        Ok(self.store.list_vps_by_owner(owner_id)?)
    }

    fn list_all(&self) -> Result<Vec<VpsRecord>> {
        Ok(self.store.list_all_vps()?)
    }

    fn get_vps(&self, vps_id: VpsId) -> Result<Option<VpsRecord>> {
        Ok(self.store.get_vps(vps_id)?)
    }

    fn plans(&self) -> Vec<Plan> {
        self.catalog.list()
    }

    fn reload_plans(&self) -> Result<()> {
        self.catalog.reload()?;
        Ok(())
    }

    fn update_plan(
        &self,
        key: &str,
        ram_mb: u32,
        cpu_cores: u32,
        disk_gb: u32,
        price: Option<u64>,
    ) -> Result<Plan> {
        Ok(self
            .catalog
            .update_plan(key, ram_mb, cpu_cores, disk_gb, price)?)
    }
}
