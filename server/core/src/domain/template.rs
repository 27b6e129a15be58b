// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Deployment Templates
//!
//! Immutable catalog entries describing pre-configured swarm shapes.
//! Read-mostly; no lifecycle beyond creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::agent::AgentType;
use crate::domain::validation::{ValidationError, MAX_AGENT_CAPACITY, MIN_AGENT_CAPACITY};

/// Unique identifier for a [`Template`] (UUID newtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct TemplateId(pub Uuid);

impl TemplateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub template_type: AgentType,
    pub icon: String,
    pub min_agents: i32,
    pub max_agents: i32,
    pub default_config: Option<Value>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub template_type: AgentType,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_min_agents")]
    pub min_agents: i32,
    #[serde(default = "default_max_agents")]
    pub max_agents: i32,
    #[serde(default)]
    pub default_config: Option<Value>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_icon() -> String {
    "fas fa-cubes".to_string()
}

fn default_min_agents() -> i32 {
    1
}

fn default_max_agents() -> i32 {
    100
}

fn default_is_public() -> bool {
    true
}

impl NewTemplate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName("template"));
        }
        if !(MIN_AGENT_CAPACITY..=MAX_AGENT_CAPACITY).contains(&self.max_agents) {
            return Err(ValidationError::CapacityOutOfRange {
                field: "maxAgents",
                value: self.max_agents,
            });
        }
        if self.min_agents < MIN_AGENT_CAPACITY || self.min_agents > self.max_agents {
            return Err(ValidationError::CapacityOutOfRange {
                field: "minAgents",
                value: self.min_agents,
            });
        }
        Ok(())
    }
}
