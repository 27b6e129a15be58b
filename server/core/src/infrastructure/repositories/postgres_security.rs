// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Security-Alert Repository
//!
//! Production `SecurityAlertRepository` backed by the `security_alerts`
//! table. The owner-scoped listing joins through the owning swarm, so
//! alerts without a swarm never appear in it.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::repository::{RepositoryError, SecurityAlertRepository};
use crate::domain::security::{AlertId, NewSecurityAlert, SecurityAlert};
use crate::domain::user::UserId;

pub struct PostgresSecurityAlertRepository {
    pool: PgPool,
}

impl PostgresSecurityAlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecurityAlertRepository for PostgresSecurityAlertRepository {
    async fn list_unresolved_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SecurityAlert>, RepositoryError> {
        let alerts = sqlx::query_as::<_, SecurityAlert>(
            "SELECT al.id, al.title, al.description, al.severity, al.swarm_id, \
                    al.agent_id, al.resolved, al.created_at, al.resolved_at \
             FROM security_alerts al \
             JOIN swarms s ON al.swarm_id = s.id \
             WHERE s.owner_id = $1 AND al.resolved = FALSE \
             ORDER BY al.created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    async fn create(&self, alert: NewSecurityAlert) -> Result<SecurityAlert, RepositoryError> {
        let alert = sqlx::query_as::<_, SecurityAlert>(
            "INSERT INTO security_alerts (title, description, severity, swarm_id, agent_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, title, description, severity, swarm_id, agent_id, \
                       resolved, created_at, resolved_at",
        )
        .bind(alert.title)
        .bind(alert.description)
        .bind(alert.severity)
        .bind(alert.swarm_id)
        .bind(alert.agent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(alert)
    }

    async fn resolve(&self, id: AlertId) -> Result<(), RepositoryError> {
        // first write wins; re-resolving keeps the original resolved_at
        sqlx::query(
            "UPDATE security_alerts SET resolved = TRUE, resolved_at = NOW() \
             WHERE id = $1 AND resolved = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
