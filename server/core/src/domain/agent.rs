// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Aggregate
//!
//! A typed unit of work belonging to exactly one swarm. Creating or deleting
//! an agent also adjusts the owning swarm's cached `agent_count`; the
//! repository performs both writes in a single transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::swarm::SwarmId;
use crate::domain::validation::ValidationError;

/// Unique identifier for an [`Agent`] (UUID newtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Workload category of an agent. Also used by templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "agent_type", rename_all = "snake_case")]
pub enum AgentType {
    Cybersecurity,
    DataAnalysis,
    Automation,
    Monitoring,
    Custom,
}

/// Lifecycle status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "agent_status", rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Inactive,
    Error,
    Initializing,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self::Initializing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub agent_type: AgentType,
    pub status: AgentStatus,
    pub swarm_id: SwarmId,
    pub config: Option<Value>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    #[serde(default)]
    pub status: AgentStatus,
    pub swarm_id: SwarmId,
    #[serde(default)]
    pub config: Option<Value>,
}

impl NewAgent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName("agent"));
        }
        Ok(())
    }
}

/// Partial update for an agent. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub agent_type: Option<AgentType>,
    #[serde(default)]
    pub status: Option<AgentStatus>,
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub last_heartbeat: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AgentType::DataAnalysis).unwrap(),
            "\"data_analysis\""
        );
    }

    #[test]
    fn new_agent_requires_name() {
        let agent = NewAgent {
            name: String::new(),
            agent_type: AgentType::Monitoring,
            status: AgentStatus::default(),
            swarm_id: SwarmId::new(),
            config: None,
        };
        assert!(agent.validate().is_err());
    }

    #[test]
    fn wire_field_is_named_type() {
        let agent = NewAgent {
            name: "sentinel".to_string(),
            agent_type: AgentType::Cybersecurity,
            status: AgentStatus::default(),
            swarm_id: SwarmId::new(),
            config: None,
        };
        let json = serde_json::to_value(&agent).unwrap();
        assert_eq!(json["type"], "cybersecurity");
        assert_eq!(json["status"], "initializing");
    }
}
