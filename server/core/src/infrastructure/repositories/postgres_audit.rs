// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL API-Call Audit Log
//!
//! Append-only `ApiCallRepository` over the `api_calls` table. Rows are
//! written by the audit middleware after every `/api` response; the
//! time-windowed count serves traffic reporting.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::postgres::PgPool;

use crate::domain::audit::NewApiCall;
use crate::domain::repository::{ApiCallRepository, RepositoryError};

pub struct PostgresApiCallRepository {
    pool: PgPool,
}

impl PostgresApiCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiCallRepository for PostgresApiCallRepository {
    async fn log(&self, call: NewApiCall) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO api_calls (endpoint, method, user_id, swarm_id, response_time, status_code) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(call.endpoint)
        .bind(call.method)
        .bind(call.user_id)
        .bind(call.swarm_id)
        .bind(call.response_time)
        .bind(call.status_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_since(&self, window_hours: i64) -> Result<i64, RepositoryError> {
        let cutoff = Utc::now() - Duration::hours(window_hours);
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM api_calls WHERE created_at >= $1")
                .bind(cutoff)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
