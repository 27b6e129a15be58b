// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # SwarmWare Core
//!
//! Domain types, application services, persistence and the HTTP surface of
//! the SwarmWare dashboard backend.
//!
//! # Architecture
//!
//! - **domain** — entity aggregates, repository interfaces, broadcast events
//! - **application** — the dashboard statistics engine
//! - **infrastructure** — Postgres and in-memory repositories, the event bus
//! - **presentation** — axum REST routes, the `/ws` channel, audit middleware

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
