//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Account records (credit balances), keyed by `user_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Primary VPS records, keyed by `vps_id`.
    pub const VPS: &str = "vps";

    /// Index: VPS records by owner, keyed by `owner_id || vps_id`.
    pub const VPS_BY_OWNER: &str = "vps_by_owner";

    /// Engine metadata, currently only the VPS id counter.
    pub const META: &str = "meta";
}

/// Key in the `meta` column family holding the next VPS id to allocate.
pub const NEXT_VPS_ID_KEY: &[u8] = b"next_vps_id";

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::ACCOUNTS, cf::VPS, cf::VPS_BY_OWNER, cf::META]
}
