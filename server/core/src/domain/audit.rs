// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # API-Call Audit Log
//!
//! Append-only record of REST requests, used for time-windowed counting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::swarm::SwarmId;
use crate::domain::user::UserId;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall {
    pub id: Uuid,
    pub endpoint: String,
    pub method: String,
    pub user_id: Option<UserId>,
    pub swarm_id: Option<SwarmId>,
    /// Handler latency in milliseconds.
    pub response_time: Option<i32>,
    pub status_code: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Append payload for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApiCall {
    pub endpoint: String,
    pub method: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub swarm_id: Option<SwarmId>,
    #[serde(default)]
    pub response_time: Option<i32>,
    #[serde(default)]
    pub status_code: Option<i32>,
}
