// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Swarm Repository
//!
//! Production `SwarmRepository` backed by the `swarms` table via `sqlx`.
//! Deletion relies on the schema's `ON DELETE CASCADE` to remove child
//! agents and alerts in the same statement.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::repository::{RepositoryError, SwarmRepository};
use crate::domain::swarm::{NewSwarm, Swarm, SwarmId, SwarmUpdate};
use crate::domain::user::UserId;

const SWARM_COLUMNS: &str = "id, name, description, status, template_id, owner_id, \
     agent_count, max_agents, auto_scaling, security_config, created_at, updated_at";

pub struct PostgresSwarmRepository {
    pool: PgPool,
}

impl PostgresSwarmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SwarmRepository for PostgresSwarmRepository {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Swarm>, RepositoryError> {
        let swarms = sqlx::query_as::<_, Swarm>(&format!(
            "SELECT {SWARM_COLUMNS} FROM swarms WHERE owner_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(swarms)
    }

    async fn find_by_id(&self, id: SwarmId) -> Result<Option<Swarm>, RepositoryError> {
        let swarm = sqlx::query_as::<_, Swarm>(&format!(
            "SELECT {SWARM_COLUMNS} FROM swarms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(swarm)
    }

    async fn create(&self, swarm: NewSwarm) -> Result<Swarm, RepositoryError> {
        // agent_count is the cached child counter and always starts at 0;
        // the hint in the payload is presentation-only.
        let swarm = sqlx::query_as::<_, Swarm>(&format!(
            "INSERT INTO swarms \
                 (name, description, status, template_id, owner_id, agent_count, \
                  max_agents, auto_scaling, security_config) \
             VALUES ($1, $2, $3, $4, $5, 0, $6, $7, $8) \
             RETURNING {SWARM_COLUMNS}"
        ))
        .bind(swarm.name)
        .bind(swarm.description)
        .bind(swarm.status)
        .bind(swarm.template_id)
        .bind(swarm.owner_id)
        .bind(swarm.max_agents)
        .bind(swarm.auto_scaling)
        .bind(swarm.security_config)
        .fetch_one(&self.pool)
        .await?;
        Ok(swarm)
    }

    async fn update(&self, id: SwarmId, updates: SwarmUpdate) -> Result<Swarm, RepositoryError> {
        let swarm = sqlx::query_as::<_, Swarm>(&format!(
            "UPDATE swarms SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 status = COALESCE($4, status), \
                 max_agents = COALESCE($5, max_agents), \
                 auto_scaling = COALESCE($6, auto_scaling), \
                 security_config = COALESCE($7, security_config), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SWARM_COLUMNS}"
        ))
        .bind(id)
        .bind(updates.name)
        .bind(updates.description)
        .bind(updates.status)
        .bind(updates.max_agents)
        .bind(updates.auto_scaling)
        .bind(updates.security_config)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("swarm"))?;
        Ok(swarm)
    }

    async fn delete(&self, id: SwarmId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM swarms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_active_for_owner(&self, owner: &UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM swarms WHERE owner_id = $1 AND status = 'active'",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
