//! Lifecycle control for registered containers.
//!
//! A lifecycle action resolves the registry record, issues exactly one
//! runtime invocation, and reports the captured output. The registry is
//! never mutated here: the record's stored status is advisory, and the
//! runtime's own view of the container is authoritative.

use lxforge_core::VpsId;
use lxforge_store::Store;
use tracing::info;

use crate::commands::RuntimeGateway;
use crate::error::{EngineError, Result};
use crate::types::{ActionReport, LifecycleAction};

/// Apply a lifecycle action to a registered VPS.
///
/// # Errors
///
/// `NotFound` if no record exists (no gateway call is made), `TimedOut` if
/// the invocation exceeded its deadline, `ActionFailed` with the captured
/// diagnostic if the runtime exited non-zero, or a storage/runtime error.
pub async fn apply<S: Store + ?Sized>(
    store: &S,
    gateway: &RuntimeGateway,
    vps_id: VpsId,
    action: LifecycleAction,
) -> Result<ActionReport> {
    let record = store
        .get_vps(vps_id)?
        .ok_or(EngineError::NotFound(vps_id))?;

    let output = gateway.action(&record.container_name, action).await?;
    if !output.success() {
        if output.is_timeout() {
            return Err(EngineError::TimedOut);
        }
        return Err(EngineError::ActionFailed(output.diagnostic().to_string()));
    }

    info!(
        vps_id = %vps_id,
        container = %record.container_name,
        %action,
        "applied lifecycle action"
    );

    let text = if output.stdout.is_empty() {
        "OK".to_string()
    } else {
        output.stdout
    };

    Ok(ActionReport {
        action,
        container_name: record.container_name,
        output: text,
    })
}
