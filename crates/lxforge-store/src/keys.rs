//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions to encode and decode keys for the account
//! table, the VPS table, and the owner index. All integer components are
//! big-endian so keys sort numerically and support efficient prefix scans.

use lxforge_core::{UserId, VpsId};

/// Encode an account key (the user id bytes).
#[must_use]
pub fn account_key(user_id: UserId) -> [u8; 8] {
    user_id.to_be_bytes()
}

/// Encode a VPS key (the vps id bytes).
#[must_use]
pub fn vps_key(vps_id: VpsId) -> [u8; 8] {
    vps_id.to_be_bytes()
}

/// Encode an owner-vps index key: `owner_id || vps_id`.
///
/// This allows efficient prefix scans for all VPS records owned by a user.
#[must_use]
pub fn owner_vps_key(owner_id: UserId, vps_id: VpsId) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&owner_id.to_be_bytes());
    key.extend_from_slice(&vps_id.to_be_bytes());
    key
}

/// Encode an owner prefix for scanning all VPS records by owner.
#[must_use]
pub fn owner_prefix(owner_id: UserId) -> [u8; 8] {
    owner_id.to_be_bytes()
}

/// Extract the VPS id from an owner-vps index key.
///
/// # Panics
///
/// Panics if the key is not at least 16 bytes.
#[must_use]
pub fn extract_vps_id_from_owner_key(key: &[u8]) -> VpsId {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&key[8..16]);
    VpsId::from_be_bytes(bytes)
}
