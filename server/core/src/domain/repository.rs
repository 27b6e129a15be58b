// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts, one repository per aggregate root: interface here,
//! implementations in `crate::infrastructure::repositories` (Postgres for
//! production, in-memory for development and tests).
//!
//! | Trait | Aggregate |
//! |-------|-----------|
//! | `UserRepository` | `User` |
//! | `SwarmRepository` | `Swarm` |
//! | `AgentRepository` | `Agent` |
//! | `TemplateRepository` | `Template` |
//! | `SecurityAlertRepository` | `SecurityAlert` |
//! | `ApiCallRepository` | `ApiCall` (append-only audit log) |
//! | `AppStateStore` | `AppStateEntry` (key/value simulation state) |
//!
//! Not-found policy: reads return `Ok(None)`, updates of a missing id fail
//! with [`RepositoryError::NotFound`], deletes are tolerant no-ops.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::agent::{Agent, AgentId, AgentUpdate, NewAgent};
use crate::domain::app_state::AppStateEntry;
use crate::domain::audit::NewApiCall;
use crate::domain::security::{AlertId, NewSecurityAlert, SecurityAlert};
use crate::domain::swarm::{NewSwarm, Swarm, SwarmId, SwarmUpdate};
use crate::domain::template::{NewTemplate, Template, TemplateId};
use crate::domain::user::{UpsertUser, User, UserId};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert the user, or refresh the existing row on id conflict.
    async fn upsert(&self, user: UpsertUser) -> Result<User, RepositoryError>;
}

#[async_trait]
pub trait SwarmRepository: Send + Sync {
    /// All swarms owned by `owner`, most recently touched first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Swarm>, RepositoryError>;

    async fn find_by_id(&self, id: SwarmId) -> Result<Option<Swarm>, RepositoryError>;

    /// Persist a new swarm. The cached `agent_count` always starts at 0.
    async fn create(&self, swarm: NewSwarm) -> Result<Swarm, RepositoryError>;

    /// Partial update; refreshes `updated_at`.
    async fn update(&self, id: SwarmId, updates: SwarmUpdate) -> Result<Swarm, RepositoryError>;

    /// Delete the swarm and, by cascade, its agents and alerts. No-op when
    /// the id does not exist.
    async fn delete(&self, id: SwarmId) -> Result<(), RepositoryError>;

    async fn count_active_for_owner(&self, owner: &UserId) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// All agents of a swarm, newest first.
    async fn list_for_swarm(&self, swarm_id: SwarmId) -> Result<Vec<Agent>, RepositoryError>;

    async fn find_by_id(&self, id: AgentId) -> Result<Option<Agent>, RepositoryError>;

    /// Persist the agent and increment the parent swarm's `agent_count`,
    /// both in one transaction.
    async fn create(&self, agent: NewAgent) -> Result<Agent, RepositoryError>;

    async fn update(&self, id: AgentId, updates: AgentUpdate) -> Result<Agent, RepositoryError>;

    /// Delete the agent and decrement the parent swarm's `agent_count`
    /// (clamped at 0), both in one transaction. No-op when absent.
    async fn delete(&self, id: AgentId) -> Result<(), RepositoryError>;

    /// Count of agents whose swarm is owned by `owner`.
    async fn count_for_owner(&self, owner: &UserId) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Public catalog entries, newest first.
    async fn list_public(&self) -> Result<Vec<Template>, RepositoryError>;

    async fn find_by_id(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError>;

    async fn create(&self, template: NewTemplate) -> Result<Template, RepositoryError>;
}

#[async_trait]
pub trait SecurityAlertRepository: Send + Sync {
    /// Unresolved alerts joined through the owning swarm of `owner`, newest
    /// first. Alerts without a swarm are not visible in this view.
    async fn list_unresolved_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SecurityAlert>, RepositoryError>;

    async fn create(&self, alert: NewSecurityAlert) -> Result<SecurityAlert, RepositoryError>;

    /// Terminal transition to `resolved = true`. First write wins; resolving
    /// an already-resolved or unknown alert is a no-op.
    async fn resolve(&self, id: AlertId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ApiCallRepository: Send + Sync {
    /// Append-only insert.
    async fn log(&self, call: NewApiCall) -> Result<(), RepositoryError>;

    /// Count of audit rows created within the trailing window.
    async fn count_since(&self, window_hours: i64) -> Result<i64, RepositoryError>;
}

/// Outcome of a [`AppStateStore::read_modify`] decision function.
pub struct ReadModifyOutcome {
    /// New `(counter, stamp)` values to persist, or `None` to leave the
    /// stored state untouched.
    pub persist: Option<(Value, Value)>,
    /// Value reported back to the caller.
    pub result: Value,
}

/// Synchronous decision applied to `(counter, stamp)` while their rows are
/// locked.
pub type ReadModifyFn = Box<dyn FnOnce(Option<Value>, Option<Value>) -> ReadModifyOutcome + Send>;

#[async_trait]
pub trait AppStateStore: Send + Sync {
    /// Missing keys are `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> Result<Option<AppStateEntry>, RepositoryError>;

    /// Single-statement upsert of `value` under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), RepositoryError>;

    /// Seed the well-known keys that do not exist yet. Idempotent: calling
    /// this on every process start never resets already-evolved state.
    async fn initialize_defaults(&self, now: DateTime<Utc>) -> Result<(), RepositoryError>;

    /// Read `counter_key` and `stamp_key` under per-key locks, apply the
    /// decision, and persist its outcome in the same transaction. This is
    /// the only sanctioned way to advance a simulated counter; it closes
    /// the lost-update window between concurrent readers.
    async fn read_modify(
        &self,
        counter_key: &str,
        stamp_key: &str,
        apply: ReadModifyFn,
    ) -> Result<Value, RepositoryError>;

    /// Atomically add `delta` to the integer counter under `key`, treating
    /// an absent or non-numeric value as 0. Returns the new total.
    async fn increment_counter(&self, key: &str, delta: i64) -> Result<i64, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
