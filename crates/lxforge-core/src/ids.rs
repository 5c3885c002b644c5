//! Strongly-typed identifiers for users and VPS records.
//!
//! Both identifiers wrap a `u64`. User ids come from the chat platform and
//! are never generated here; VPS ids are allocated by the registry from a
//! monotonically increasing counter. The byte encodings are big-endian so
//! that store keys sort in numeric order and support prefix scans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The opaque numeric identity of an account holder.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Create a `UserId` from its raw numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Return the raw numeric value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Return the big-endian byte encoding used for store keys.
    #[must_use]
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode a `UserId` from its big-endian key encoding.
    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self).map_err(|_| IdError::InvalidNumber)
    }
}

/// The opaque incrementing identifier of an issued VPS.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VpsId(u64);

impl VpsId {
    /// Create a `VpsId` from its raw numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Return the raw numeric value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Return the big-endian byte encoding used for store keys.
    #[must_use]
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode a `VpsId` from its big-endian key encoding.
    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Debug for VpsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VpsId({})", self.0)
    }
}

impl fmt::Display for VpsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VpsId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for VpsId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self).map_err(|_| IdError::InvalidNumber)
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid unsigned integer.
    #[error("invalid numeric identifier")]
    InvalidNumber,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_key_roundtrip() {
        let id = UserId::new(123_456_789);
        let bytes = id.to_be_bytes();
        assert_eq!(UserId::from_be_bytes(bytes), id);
    }

    #[test]
    fn user_id_keys_sort_numerically() {
        let small = UserId::new(2).to_be_bytes();
        let large = UserId::new(300).to_be_bytes();
        assert!(small < large);
    }

    #[test]
    fn vps_id_key_roundtrip() {
        let id = VpsId::new(42);
        let bytes = id.to_be_bytes();
        assert_eq!(VpsId::from_be_bytes(bytes), id);
    }

    #[test]
    fn user_id_parse() {
        let id: UserId = "42".parse().unwrap();
        assert_eq!(id, UserId::new(42));

        let err = "not-a-number".parse::<UserId>();
        assert!(matches!(err, Err(IdError::InvalidNumber)));
    }

    #[test]
    fn user_id_serde_json() {
        let id = UserId::new(987);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "987");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn vps_id_serde_json() {
        let id = VpsId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: VpsId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
