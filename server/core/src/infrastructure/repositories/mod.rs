// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Repository Implementations
//!
//! Concrete persistence for the interfaces in `domain::repository`:
//! PostgreSQL (production) and a single in-memory store (development and
//! tests) that implements every trait behind one mutex.

pub mod memory;
pub mod postgres_agent;
pub mod postgres_app_state;
pub mod postgres_audit;
pub mod postgres_security;
pub mod postgres_swarm;
pub mod postgres_template;
pub mod postgres_user;

pub use memory::InMemoryStore;
pub use postgres_agent::PostgresAgentRepository;
pub use postgres_app_state::PostgresAppStateStore;
pub use postgres_audit::PostgresApiCallRepository;
pub use postgres_security::PostgresSecurityAlertRepository;
pub use postgres_swarm::PostgresSwarmRepository;
pub use postgres_template::PostgresTemplateRepository;
pub use postgres_user::PostgresUserRepository;
