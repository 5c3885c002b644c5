//! The provisioning workflow: Purchase, Grant, and Teardown transactions.
//!
//! Each transaction is a finite sequence of steps across the ledger, the
//! registry, and the process gateway, with explicit compensation rules on
//! failure. The guiding invariant is that a registry record exists iff a
//! container is believed to exist; on any conflict between registry
//! accuracy and billing symmetry, registry accuracy wins.

use chrono::Utc;
use lxforge_core::{UserId, VpsId};
use lxforge_store::{NewVps, Store, VpsRecord};
use tracing::{info, warn};

use crate::catalog::{Plan, PlanCatalog};
use crate::commands::RuntimeGateway;
use crate::error::{EngineError, Result};
use crate::naming;
use crate::types::{Provisioned, TornDown};

/// Purchase a VPS: debit the actor and create a container plus record.
///
/// Step order matters. The launch happens before the debit so a failed
/// launch costs nothing. If the debit then fails (the balance changed since
/// the advisory check), the already-launched container is NOT destroyed: it
/// is registered for the actor uncharged, because compensating here would
/// tear down a real resource the actor may have started using. That
/// asymmetry is deliberate; `new_balance` is `None` when it happens.
///
/// # Errors
///
/// `UnknownPlan`, `InsufficientCredits` (no side effects), `TimedOut` or
/// `ProvisionFailed` (launch failed, nothing debited or registered), or a
/// storage/runtime error.
pub async fn purchase<S: Store + ?Sized>(
    store: &S,
    gateway: &RuntimeGateway,
    catalog: &PlanCatalog,
    default_arch: &str,
    actor: UserId,
    plan_key: &str,
) -> Result<Provisioned> {
    let plan = lookup_plan(catalog, plan_key)?;

    // Advisory check: fail fast with no side effects. The authoritative
    // check is the atomic debit after launch.
    let balance = store.balance(actor)?;
    if balance < plan.price {
        return Err(EngineError::InsufficientCredits {
            needed: plan.price,
            balance,
        });
    }

    let container_name = launch(gateway, &plan, actor).await?;

    // The debit returns the post-debit balance from under its own lock, so
    // the reported balance is always the pre-debit balance minus the price.
    let new_balance = store.check_and_debit(actor, plan.price)?;
    if new_balance.is_none() {
        warn!(
            user = %actor,
            container = %container_name,
            price = plan.price,
            "balance changed during launch, container granted uncharged"
        );
    }

    let record = register(store, &plan, actor, container_name, default_arch)?;

    info!(
        vps_id = %record.id,
        user = %actor,
        container = %record.container_name,
        plan = %plan.key,
        "purchased vps"
    );

    Ok(Provisioned {
        vps_id: record.id,
        container_name: record.container_name,
        new_balance,
    })
}

/// Grant a VPS to a user with no ledger interaction.
///
/// Identical to [`purchase`] minus the balance check and debit; used for
/// admin-issued containers.
///
/// # Errors
///
/// `UnknownPlan`, `TimedOut` or `ProvisionFailed`, or a storage/runtime
/// error.
pub async fn grant<S: Store + ?Sized>(
    store: &S,
    gateway: &RuntimeGateway,
    catalog: &PlanCatalog,
    default_arch: &str,
    target: UserId,
    plan_key: &str,
) -> Result<Provisioned> {
    let plan = lookup_plan(catalog, plan_key)?;
    let container_name = launch(gateway, &plan, target).await?;
    let record = register(store, &plan, target, container_name, default_arch)?;

    info!(
        vps_id = %record.id,
        user = %target,
        container = %record.container_name,
        plan = %plan.key,
        "granted vps"
    );

    Ok(Provisioned {
        vps_id: record.id,
        container_name: record.container_name,
        new_balance: None,
    })
}

/// Tear down a VPS: delete the container, then remove the record.
///
/// The stop step is best-effort; only the delete step gates the record
/// removal. A failed delete leaves the record intact so the inconsistency
/// stays visible and retryable. No credits are refunded. Authorization is
/// the caller's responsibility.
///
/// # Errors
///
/// `NotFound` (no gateway call is made), `TimedOut` or `TeardownFailed`
/// (record retained), or a storage/runtime error.
pub async fn teardown<S: Store + ?Sized>(
    store: &S,
    gateway: &RuntimeGateway,
    vps_id: VpsId,
) -> Result<TornDown> {
    let record = store
        .get_vps(vps_id)?
        .ok_or(EngineError::NotFound(vps_id))?;

    match gateway.stop_force(&record.container_name).await {
        Ok(output) if !output.success() => {
            warn!(
                vps_id = %vps_id,
                container = %record.container_name,
                diagnostic = output.diagnostic(),
                "best-effort stop failed before delete"
            );
        }
        Err(err) => {
            warn!(
                vps_id = %vps_id,
                container = %record.container_name,
                error = %err,
                "best-effort stop failed before delete"
            );
        }
        Ok(_) => {}
    }

    let output = gateway.delete(&record.container_name).await?;
    if !output.success() {
        if output.is_timeout() {
            return Err(EngineError::TimedOut);
        }
        return Err(EngineError::TeardownFailed(
            output.diagnostic().to_string(),
        ));
    }

    store.delete_vps(vps_id)?;

    info!(
        vps_id = %vps_id,
        container = %record.container_name,
        "tore down vps"
    );

    Ok(TornDown {
        vps_id,
        container_name: record.container_name,
    })
}

fn lookup_plan(catalog: &PlanCatalog, plan_key: &str) -> Result<Plan> {
    catalog
        .get(plan_key)
        .ok_or_else(|| EngineError::UnknownPlan(plan_key.to_string()))
}

/// Generate a name and launch the container, mapping launch failures.
async fn launch(gateway: &RuntimeGateway, plan: &Plan, owner: UserId) -> Result<String> {
    let container_name = naming::container_name(owner, &plan.key, Utc::now());

    let output = gateway
        .launch(&container_name, plan.ram_mb, plan.cpu_cores)
        .await?;
    if !output.success() {
        if output.is_timeout() {
            return Err(EngineError::TimedOut);
        }
        return Err(EngineError::ProvisionFailed(
            output.diagnostic().to_string(),
        ));
    }

    Ok(container_name)
}

fn register<S: Store + ?Sized>(
    store: &S,
    plan: &Plan,
    owner: UserId,
    container_name: String,
    default_arch: &str,
) -> Result<VpsRecord> {
    Ok(store.create_vps(NewVps {
        owner_id: owner,
        container_name,
        plan_key: plan.key.clone(),
        ram_mb: plan.ram_mb,
        cpu_cores: plan.cpu_cores,
        arch: default_arch.to_string(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{scripted, ScriptedRuntime};
    use lxforge_runtime::{CommandOutput, ContainerRuntime, RuntimeConfig};
    use lxforge_store::RocksStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        store: Arc<RocksStore>,
        runtime: Arc<ScriptedRuntime>,
        gateway: RuntimeGateway,
        catalog: PlanCatalog,
        _dir: TempDir,
    }

    fn setup() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path().join("db")).unwrap());
        let runtime = scripted();
        let gateway = RuntimeGateway::new(Arc::clone(&runtime) as Arc<dyn ContainerRuntime>, RuntimeConfig::default());
        let catalog = PlanCatalog::load(dir.path().join("plans.json")).unwrap();
        Fixture {
            store,
            runtime,
            gateway,
            catalog,
            _dir: dir,
        }
    }

    const ACTOR: UserId = UserId::new(42);

    #[tokio::test]
    async fn purchase_success() {
        let f = setup();
        f.store.add_credits(ACTOR, 10).unwrap();

        // "small" costs 2 credits in the default catalog
        let outcome = purchase(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "small")
            .await
            .unwrap();

        assert!(outcome.container_name.starts_with("user42-small-"));
        assert_eq!(outcome.new_balance, Some(8));
        assert_eq!(f.store.balance(ACTOR).unwrap(), 8);

        let record = f.store.get_vps(outcome.vps_id).unwrap().unwrap();
        assert_eq!(record.owner_id, ACTOR);
        assert_eq!(record.plan_key, "small");
        assert_eq!(record.ram_mb, 1024);
        assert_eq!(record.arch, "intel");

        assert_eq!(f.runtime.calls()[0][0], "launch");
    }

    #[tokio::test]
    async fn purchase_unknown_plan() {
        let f = setup();

        let result = purchase(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "gigantic").await;
        assert!(matches!(result, Err(EngineError::UnknownPlan(_))));
        assert!(f.runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn purchase_insufficient_credits_has_no_side_effects() {
        let f = setup();
        f.store.add_credits(ACTOR, 1).unwrap();

        let result = purchase(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "small").await;
        assert!(matches!(
            result,
            Err(EngineError::InsufficientCredits {
                needed: 2,
                balance: 1
            })
        ));

        // No container attempted, no debit, no record
        assert!(f.runtime.calls().is_empty());
        assert_eq!(f.store.balance(ACTOR).unwrap(), 1);
        assert!(f.store.list_all_vps().unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_launch_failure_rolls_nothing_forward() {
        let f = setup();
        f.store.add_credits(ACTOR, 10).unwrap();
        f.runtime.push(ScriptedRuntime::failure("no such image"));

        let result = purchase(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "small").await;
        assert!(matches!(result, Err(EngineError::ProvisionFailed(ref msg)) if msg == "no such image"));

        assert_eq!(f.store.balance(ACTOR).unwrap(), 10);
        assert!(f.store.list_all_vps().unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_launch_timeout_is_distinct() {
        let f = setup();
        f.store.add_credits(ACTOR, 10).unwrap();
        f.runtime.push(CommandOutput::for_timeout());

        let result = purchase(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "small").await;
        assert!(matches!(result, Err(EngineError::TimedOut)));

        assert_eq!(f.store.balance(ACTOR).unwrap(), 10);
        assert!(f.store.list_all_vps().unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_debit_race_grants_container_uncharged() {
        let f = setup();
        f.store.add_credits(ACTOR, 2).unwrap();

        // Drain the balance while the launch is in flight, so the atomic
        // debit fails even though the advisory check passed.
        let store = Arc::clone(&f.store);
        f.runtime.on_call(move || {
            store.remove_credits(ACTOR, 100).unwrap();
        });

        let outcome = purchase(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "small")
            .await
            .unwrap();

        // The container is kept and registered, but nothing was charged
        assert_eq!(outcome.new_balance, None);
        assert!(f.store.get_vps(outcome.vps_id).unwrap().is_some());
        assert_eq!(f.store.balance(ACTOR).unwrap(), 0);
    }

    #[tokio::test]
    async fn purchase_reports_the_atomic_post_debit_balance() {
        let f = setup();
        f.store.add_credits(ACTOR, 10).unwrap();

        // Credits arriving while the launch is in flight must be reflected
        // in the reported balance. The launch makes three gateway calls
        // (launch plus two limit sets), each adding 5 here, so the debit of
        // 2 lands on a balance of 25.
        let store = Arc::clone(&f.store);
        f.runtime.on_call(move || {
            store.add_credits(ACTOR, 5).unwrap();
        });

        let outcome = purchase(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "small")
            .await
            .unwrap();

        assert_eq!(outcome.new_balance, Some(23));
        assert_eq!(f.store.balance(ACTOR).unwrap(), 23);
    }

    #[tokio::test]
    async fn grant_skips_the_ledger() {
        let f = setup();
        let target = UserId::new(7);

        let outcome = grant(&*f.store, &f.gateway, &f.catalog, "intel", target, "basic")
            .await
            .unwrap();

        assert_eq!(outcome.new_balance, None);
        assert_eq!(f.store.balance(target).unwrap(), 0);

        let record = f.store.get_vps(outcome.vps_id).unwrap().unwrap();
        assert_eq!(record.owner_id, target);
    }

    #[tokio::test]
    async fn teardown_success_removes_record() {
        let f = setup();
        let outcome = grant(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "basic")
            .await
            .unwrap();

        let torn = teardown(&*f.store, &f.gateway, outcome.vps_id).await.unwrap();
        assert_eq!(torn.container_name, outcome.container_name);
        assert!(f.store.get_vps(outcome.vps_id).unwrap().is_none());

        let calls = f.runtime.calls();
        let stop = &calls[calls.len() - 2];
        let delete = &calls[calls.len() - 1];
        assert_eq!(stop[0], "stop");
        assert_eq!(stop[2], "--force");
        assert_eq!(delete[0], "delete");
    }

    #[tokio::test]
    async fn teardown_ignores_stop_failure() {
        let f = setup();
        let outcome = grant(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "basic")
            .await
            .unwrap();

        f.runtime.push(ScriptedRuntime::failure("already stopped"));

        let result = teardown(&*f.store, &f.gateway, outcome.vps_id).await;
        assert!(result.is_ok());
        assert!(f.store.get_vps(outcome.vps_id).unwrap().is_none());
    }

    #[tokio::test]
    async fn teardown_not_found_makes_no_gateway_call() {
        let f = setup();

        let result = teardown(&*f.store, &f.gateway, VpsId::new(99)).await;
        assert!(matches!(result, Err(EngineError::NotFound(id)) if id == VpsId::new(99)));
        assert!(f.runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn teardown_delete_failure_retains_record() {
        let f = setup();
        let outcome = grant(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "basic")
            .await
            .unwrap();

        f.runtime.push(ScriptedRuntime::success("")); // stop
        f.runtime.push(ScriptedRuntime::failure("device busy")); // delete

        let result = teardown(&*f.store, &f.gateway, outcome.vps_id).await;
        assert!(matches!(result, Err(EngineError::TeardownFailed(ref msg)) if msg == "device busy"));

        // The record stays so the inconsistency is visible and retryable
        assert!(f.store.get_vps(outcome.vps_id).unwrap().is_some());
    }

    #[tokio::test]
    async fn teardown_delete_timeout_retains_record() {
        let f = setup();
        let outcome = grant(&*f.store, &f.gateway, &f.catalog, "intel", ACTOR, "basic")
            .await
            .unwrap();

        f.runtime.push(ScriptedRuntime::success("")); // stop
        f.runtime.push(CommandOutput::for_timeout()); // delete

        let result = teardown(&*f.store, &f.gateway, outcome.vps_id).await;
        assert!(matches!(result, Err(EngineError::TimedOut)));
        assert!(f.store.get_vps(outcome.vps_id).unwrap().is_some());
    }
}
