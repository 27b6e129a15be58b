// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Swarm Aggregate
//!
//! A swarm is a named collection of agents with aggregate status and
//! capacity attributes, owned by exactly one user.
//!
//! # Invariants
//!
//! - `agent_count` is a cached counter over the swarm's Agent rows. It is
//!   maintained transactionally by the agent repository and never goes
//!   negative.
//! - A creation payload may carry an `agentCount` display hint; the
//!   persisted counter always starts at 0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::domain::validation::{ValidationError, MAX_AGENT_CAPACITY, MIN_AGENT_CAPACITY};

/// Unique identifier for a [`Swarm`] (UUID newtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct SwarmId(pub Uuid);

impl SwarmId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SwarmId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SwarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "swarm_status", rename_all = "snake_case")]
pub enum SwarmStatus {
    Active,
    Inactive,
    Deploying,
    Error,
}

impl Default for SwarmStatus {
    fn default() -> Self {
        Self::Inactive
    }
}

/// Aggregate root for a group of agents.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Swarm {
    pub id: SwarmId,
    pub name: String,
    pub description: Option<String>,
    pub status: SwarmStatus,
    pub template_id: Option<Uuid>,
    pub owner_id: UserId,
    /// Cached count of this swarm's Agent rows.
    pub agent_count: i32,
    pub max_agents: i32,
    pub auto_scaling: bool,
    pub security_config: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for a swarm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSwarm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: SwarmStatus,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    pub owner_id: UserId,
    /// Display hint only; the persisted counter starts at 0.
    #[serde(default)]
    pub agent_count: Option<i32>,
    #[serde(default = "default_max_agents")]
    pub max_agents: i32,
    #[serde(default = "default_auto_scaling")]
    pub auto_scaling: bool,
    #[serde(default)]
    pub security_config: Option<Value>,
}

fn default_max_agents() -> i32 {
    100
}

fn default_auto_scaling() -> bool {
    true
}

impl NewSwarm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName("swarm"));
        }
        if !(MIN_AGENT_CAPACITY..=MAX_AGENT_CAPACITY).contains(&self.max_agents) {
            return Err(ValidationError::CapacityOutOfRange {
                field: "maxAgents",
                value: self.max_agents,
            });
        }
        Ok(())
    }
}

/// Partial update for a swarm. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<SwarmStatus>,
    #[serde(default)]
    pub max_agents: Option<i32>,
    #[serde(default)]
    pub auto_scaling: Option<bool>,
    #[serde(default)]
    pub security_config: Option<Value>,
}

impl SwarmUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingName("swarm"));
            }
        }
        if let Some(max_agents) = self.max_agents {
            if !(MIN_AGENT_CAPACITY..=MAX_AGENT_CAPACITY).contains(&max_agents) {
                return Err(ValidationError::CapacityOutOfRange {
                    field: "maxAgents",
                    value: max_agents,
                });
            }
        }
        Ok(())
    }
}
