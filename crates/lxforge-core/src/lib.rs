//! Core types for lxforge.
//!
//! This crate provides the foundational identifier types used throughout
//! the lxforge VPS platform:
//!
//! - [`UserId`]: the opaque numeric identity of an account holder, as
//!   assigned by the chat platform
//! - [`VpsId`]: the opaque incrementing identifier of an issued VPS,
//!   allocated by the registry
//!
//! # Example
//!
//! ```
//! use lxforge_core::{UserId, VpsId};
//!
//! let owner = UserId::new(42);
//! let vps = VpsId::new(7);
//!
//! assert_eq!(owner.to_string(), "42");
//! assert_eq!(vps.as_u64(), 7);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{IdError, UserId, VpsId};
