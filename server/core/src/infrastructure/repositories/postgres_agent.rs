// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Agent Repository
//!
//! Production `AgentRepository` backed by the `agents` table via `sqlx`.
//! Create and delete also maintain the parent swarm's cached `agent_count`;
//! both writes run in one transaction so a failure partway never leaves the
//! counter and the child-row set inconsistent.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::agent::{Agent, AgentId, AgentUpdate, NewAgent};
use crate::domain::repository::{AgentRepository, RepositoryError};
use crate::domain::swarm::SwarmId;
use crate::domain::user::UserId;

const AGENT_COLUMNS: &str =
    "id, name, type, status, swarm_id, config, last_heartbeat, created_at, updated_at";

pub struct PostgresAgentRepository {
    pool: PgPool,
}

impl PostgresAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for PostgresAgentRepository {
    async fn list_for_swarm(&self, swarm_id: SwarmId) -> Result<Vec<Agent>, RepositoryError> {
        let agents = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE swarm_id = $1 ORDER BY created_at DESC"
        ))
        .bind(swarm_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(agents)
    }

    async fn find_by_id(&self, id: AgentId) -> Result<Option<Agent>, RepositoryError> {
        let agent = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(agent)
    }

    async fn create(&self, agent: NewAgent) -> Result<Agent, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Agent>(&format!(
            "INSERT INTO agents (name, type, status, swarm_id, config) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {AGENT_COLUMNS}"
        ))
        .bind(agent.name)
        .bind(agent.agent_type)
        .bind(agent.status)
        .bind(agent.swarm_id)
        .bind(agent.config)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE swarms SET agent_count = agent_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(created.swarm_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, id: AgentId, updates: AgentUpdate) -> Result<Agent, RepositoryError> {
        let agent = sqlx::query_as::<_, Agent>(&format!(
            "UPDATE agents SET \
                 name = COALESCE($2, name), \
                 type = COALESCE($3, type), \
                 status = COALESCE($4, status), \
                 config = COALESCE($5, config), \
                 last_heartbeat = COALESCE($6, last_heartbeat), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {AGENT_COLUMNS}"
        ))
        .bind(id)
        .bind(updates.name)
        .bind(updates.agent_type)
        .bind(updates.status)
        .bind(updates.config)
        .bind(updates.last_heartbeat)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("agent"))?;
        Ok(agent)
    }

    async fn delete(&self, id: AgentId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let swarm_id = sqlx::query_scalar::<_, SwarmId>(
            "DELETE FROM agents WHERE id = $1 RETURNING swarm_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(swarm_id) = swarm_id {
            // clamp at zero; the cached counter must never go negative
            sqlx::query(
                "UPDATE swarms SET agent_count = GREATEST(agent_count - 1, 0), \
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(swarm_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn count_for_owner(&self, owner: &UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM agents a \
             JOIN swarms s ON a.swarm_id = s.id \
             WHERE s.owner_id = $1",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
