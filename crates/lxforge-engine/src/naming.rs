//! Container naming policy.
//!
//! Container names must be reproduced exactly for compatibility with
//! existing deployments: `user<owner_id>-<plan_key>` lowercased, every
//! character outside `[a-z0-9-]` stripped, then a `-` and a fixed-width
//! UTC timestamp suffix (`%y%m%d%H%M%S`, 2-digit year). The
//! second-granularity suffix keeps repeated purchases by the same owner and
//! plan unique; the registry does not enforce uniqueness beyond this
//! policy.

use chrono::{DateTime, Utc};
use lxforge_core::UserId;

/// Generate a container name for the given owner and plan at `now`.
#[must_use]
pub fn container_name(owner_id: UserId, plan_key: &str, now: DateTime<Utc>) -> String {
    let base = format!("user{owner_id}-{plan_key}").to_lowercase();
    let safe: String = base
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        .collect();
    format!("{safe}-{}", now.format("%y%m%d%H%M%S"))
}
