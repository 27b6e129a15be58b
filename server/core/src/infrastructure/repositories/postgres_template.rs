// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Template Repository
//!
//! Production `TemplateRepository` backed by the `templates` table.
//! Catalog entries are immutable after creation; listing only exposes
//! public rows.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::repository::{RepositoryError, TemplateRepository};
use crate::domain::template::{NewTemplate, Template, TemplateId};

const TEMPLATE_COLUMNS: &str = "id, name, description, type, icon, min_agents, max_agents, \
     default_config, is_public, created_at";

pub struct PostgresTemplateRepository {
    pool: PgPool,
}

impl PostgresTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for PostgresTemplateRepository {
    async fn list_public(&self) -> Result<Vec<Template>, RepositoryError> {
        let templates = sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE is_public = TRUE \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    async fn find_by_id(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError> {
        let template = sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template)
    }

    async fn create(&self, template: NewTemplate) -> Result<Template, RepositoryError> {
        let template = sqlx::query_as::<_, Template>(&format!(
            "INSERT INTO templates \
                 (name, description, type, icon, min_agents, max_agents, default_config, is_public) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(template.name)
        .bind(template.description)
        .bind(template.template_type)
        .bind(template.icon)
        .bind(template.min_agents)
        .bind(template.max_agents)
        .bind(template.default_config)
        .bind(template.is_public)
        .fetch_one(&self.pool)
        .await?;
        Ok(template)
    }
}
