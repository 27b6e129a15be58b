// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Persisted Application State
//!
//! Generic key/value storage used to carry the simulated dashboard metrics
//! across process restarts. Not domain data: no foreign keys, upsert-only,
//! never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Well-known keys in the `app_state` table.
pub mod keys {
    /// Initial seed for the simulated API-call counter.
    pub const API_CALLS_BASE: &str = "apiCallsBase";
    /// Running simulated API-call total.
    pub const API_CALLS_TOTAL: &str = "apiCallsTotal";
    /// Clock stamp for the API-call growth discipline.
    pub const LAST_API_CALL_UPDATE: &str = "lastApiCallUpdate";
    /// Running simulated security-alert count.
    pub const SECURITY_ALERTS_COUNT: &str = "securityAlertsCount";
    /// Clock stamp for the security-alert redraw discipline.
    pub const LAST_SECURITY_UPDATE: &str = "lastSecurityUpdate";
    /// Number of swarm deployments since first boot.
    pub const DEPLOYMENT_COUNT: &str = "deploymentCount";
    /// First boot time of the system.
    pub const SYSTEM_START_TIME: &str = "systemStartTime";
}

/// Seed value for the simulated API-call counter.
pub const API_CALLS_SEED: i64 = 1400;

/// Seed value for the simulated security-alert count.
pub const SECURITY_ALERTS_SEED: i64 = 3;

/// A single persisted key/value entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AppStateEntry {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}

/// Default values for the well-known keys, stamped at `now`.
///
/// `AppStateStore::initialize_defaults` inserts these only where the key is
/// absent, so already-evolved state survives restarts.
pub fn default_entries(now: DateTime<Utc>) -> Vec<(&'static str, Value)> {
    let stamp = json!(now.to_rfc3339());
    vec![
        (keys::API_CALLS_BASE, json!(API_CALLS_SEED)),
        (keys::API_CALLS_TOTAL, json!(API_CALLS_SEED)),
        (keys::LAST_API_CALL_UPDATE, stamp.clone()),
        (keys::SECURITY_ALERTS_COUNT, json!(SECURITY_ALERTS_SEED)),
        (keys::LAST_SECURITY_UPDATE, stamp.clone()),
        (keys::DEPLOYMENT_COUNT, json!(0)),
        (keys::SYSTEM_START_TIME, stamp),
    ]
}

/// Parse a persisted RFC 3339 clock stamp. Returns `None` for absent or
/// malformed values; callers treat that as "no elapsed time".
pub fn parse_stamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
