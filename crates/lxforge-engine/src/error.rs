//! Error types for the provisioning engine.
//!
//! Every workflow step failure is converted to one of these variants and
//! returned to the caller as a structured outcome, never as an unhandled
//! fault. The dispatcher renders the variant and any captured diagnostic
//! text; no automatic retry happens here.

use lxforge_core::VpsId;
use thiserror::Error;

use crate::catalog::CatalogError;

/// A result type using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur in provisioning and lifecycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested plan does not exist in the catalog.
    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    /// The actor's balance does not cover the plan price.
    #[error("insufficient credits: need {needed}, have {balance}")]
    InsufficientCredits {
        /// The plan price.
        needed: u64,
        /// The actor's balance at check time.
        balance: u64,
    },

    /// The container launch step failed. No debit or registry insert
    /// happened.
    #[error("provisioning failed: {0}")]
    ProvisionFailed(String),

    /// The container delete step failed. The registry record is retained so
    /// the inconsistency stays visible and retryable.
    #[error("teardown failed, record retained: {0}")]
    TeardownFailed(String),

    /// A lifecycle action exited non-zero.
    #[error("action failed: {0}")]
    ActionFailed(String),

    /// No registry record exists for this id.
    #[error("vps not found: {0}")]
    NotFound(VpsId),

    /// The gateway call exceeded its deadline. The external side effect
    /// must not be assumed to have occurred; no compensation is attempted.
    #[error("runtime call timed out")]
    TimedOut,

    /// The runtime binary could not be invoked at all. A fatal
    /// configuration problem, surfaced rather than retried.
    #[error("runtime error: {0}")]
    Runtime(#[from] lxforge_runtime::RuntimeError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] lxforge_store::StoreError),

    /// Plan catalog error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl EngineError {
    /// Returns true if the same request might succeed if repeated.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::TeardownFailed(_) | Self::TimedOut | Self::Store(_)
        )
    }
}
