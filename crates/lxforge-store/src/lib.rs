//! `RocksDB` storage layer for lxforge.
//!
//! This crate provides the two durable tables the provisioning engine
//! depends on: the credit ledger (per-user balances) and the VPS registry
//! (issued container records), using `RocksDB` with column families for
//! efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: credit balances, keyed by `user_id`
//! - `vps`: primary VPS records, keyed by `vps_id`
//! - `vps_by_owner`: index for listing VPS records by owner
//! - `meta`: the monotonically increasing VPS id counter
//!
//! All mutations for a given key are serialized through per-key locks, which
//! is what makes [`Store::check_and_debit`] a single atomic step rather than
//! a racy read-then-write.
//!
//! # Example
//!
//! ```no_run
//! use lxforge_store::{RocksStore, Store};
//! use lxforge_core::UserId;
//!
//! let store = RocksStore::open("/tmp/lxforge-db").unwrap();
//!
//! let user = UserId::new(42);
//! store.add_credits(user, 10).unwrap();
//! assert_eq!(store.check_and_debit(user, 4).unwrap(), Some(6));
//! assert_eq!(store.balance(user).unwrap(), 6);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod locks;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;
pub use types::{Account, NewVps, VpsRecord, VpsStatus};

use lxforge_core::{UserId, VpsId};

/// The storage trait defining ledger and registry operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Credit Ledger Operations
    // =========================================================================

    /// Return a user's credit balance. Unknown users have a balance of 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn balance(&self, user_id: UserId) -> Result<u64>;

    /// Unconditionally add credits, creating the account if absent.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn add_credits(&self, user_id: UserId, amount: u64) -> Result<u64>;

    /// Atomically verify `balance >= amount` and debit in one step.
    ///
    /// Returns the post-debit balance if the balance covered the amount;
    /// returns `None` and makes no change otherwise. The returned balance is
    /// computed under the same lock as the debit, so it always equals the
    /// pre-debit balance minus `amount`. Two concurrent debits against a
    /// balance that only covers one cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn check_and_debit(&self, user_id: UserId, amount: u64) -> Result<Option<u64>>;

    /// Remove credits, clamping the balance at 0.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn remove_credits(&self, user_id: UserId, amount: u64) -> Result<u64>;

    /// Reset a user's balance to 0, creating the account if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn set_credits_zero(&self, user_id: UserId) -> Result<()>;

    // =========================================================================
    // VPS Registry Operations
    // =========================================================================

    /// Insert a new VPS record, allocating the next id.
    ///
    /// This also maintains the owner index. Returns the complete record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn create_vps(&self, new: NewVps) -> Result<VpsRecord>;

    /// Get a VPS record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_vps(&self, vps_id: VpsId) -> Result<Option<VpsRecord>>;

    /// List all VPS records belonging to an owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_vps_by_owner(&self, owner_id: UserId) -> Result<Vec<VpsRecord>>;

    /// List all VPS records in the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_all_vps(&self) -> Result<Vec<VpsRecord>>;

    /// Delete a VPS record by id.
    ///
    /// This also removes the record from the owner index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record doesn't exist.
    fn delete_vps(&self, vps_id: VpsId) -> Result<()>;

    /// Update a record's status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record doesn't exist.
    fn set_vps_status(&self, vps_id: VpsId, status: VpsStatus) -> Result<()>;
}
