// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL App-State Store
//!
//! Production `AppStateStore` over the generic `app_state` key/value table.
//! Plain `set` is a single-statement upsert; the counter operations take
//! row locks (`SELECT .. FOR UPDATE`) inside one transaction so concurrent
//! dashboard readers cannot double-apply simulated growth.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::app_state::{default_entries, AppStateEntry};
use crate::domain::repository::{AppStateStore, ReadModifyFn, RepositoryError};

pub struct PostgresAppStateStore {
    pool: PgPool,
}

impl PostgresAppStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn upsert_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    key: &str,
    value: &Value,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO app_state (key, value, updated_at) VALUES ($1, $2, NOW()) \
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
    )
    .bind(key)
    .bind(value)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl AppStateStore for PostgresAppStateStore {
    async fn get(&self, key: &str) -> Result<Option<AppStateEntry>, RepositoryError> {
        let entry = sqlx::query_as::<_, AppStateEntry>(
            "SELECT key, value, updated_at FROM app_state WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO app_state (key, value, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn initialize_defaults(&self, now: DateTime<Utc>) -> Result<(), RepositoryError> {
        for (key, value) in default_entries(now) {
            sqlx::query(
                "INSERT INTO app_state (key, value, updated_at) VALUES ($1, $2, $3) \
                 ON CONFLICT (key) DO NOTHING",
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn read_modify(
        &self,
        counter_key: &str,
        stamp_key: &str,
        apply: ReadModifyFn,
    ) -> Result<Value, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT key, value FROM app_state WHERE key = ANY($1) FOR UPDATE")
            .bind(vec![counter_key.to_string(), stamp_key.to_string()])
            .fetch_all(&mut *tx)
            .await?;

        let mut counter = None;
        let mut stamp = None;
        for row in rows {
            let key: String = row.get("key");
            let value: Value = row.get("value");
            if key == counter_key {
                counter = Some(value);
            } else if key == stamp_key {
                stamp = Some(value);
            }
        }

        let outcome = apply(counter, stamp);
        if let Some((counter_value, stamp_value)) = outcome.persist {
            upsert_in_tx(&mut tx, counter_key, &counter_value).await?;
            upsert_in_tx(&mut tx, stamp_key, &stamp_value).await?;
        }

        tx.commit().await?;
        Ok(outcome.result)
    }

    async fn increment_counter(&self, key: &str, delta: i64) -> Result<i64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query("SELECT value FROM app_state WHERE key = $1 FOR UPDATE")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.get::<Value, _>("value"))
            .and_then(|value| value.as_i64())
            .unwrap_or(0);

        let next = current + delta;
        upsert_in_tx(&mut tx, key, &Value::from(next)).await?;
        tx.commit().await?;
        Ok(next)
    }
}
