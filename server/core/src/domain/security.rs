// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Security Alerts
//!
//! Severity-ranked notifications tied optionally to a swarm and/or agent.
//! An alert transitions exactly once from unresolved to resolved; the
//! transition is terminal and `resolved_at` keeps the first resolution time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::agent::AgentId;
use crate::domain::swarm::SwarmId;
use crate::domain::validation::ValidationError;

/// Unique identifier for a [`SecurityAlert`] (UUID newtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct AlertId(pub Uuid);

impl AlertId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "alert_severity", rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlert {
    pub id: AlertId,
    pub title: String,
    pub description: Option<String>,
    pub severity: AlertSeverity,
    pub swarm_id: Option<SwarmId>,
    pub agent_id: Option<AgentId>,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Creation payload for a security alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSecurityAlert {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub swarm_id: Option<SwarmId>,
    #[serde(default)]
    pub agent_id: Option<AgentId>,
}

impl NewSecurityAlert {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingName("alert"));
        }
        Ok(())
    }
}
