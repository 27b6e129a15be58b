// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the dashboard statistics engine driven over the
//! in-memory repositories with a simulated clock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use swarmware_core::application::dashboard::DashboardService;
use swarmware_core::domain::agent::{AgentStatus, AgentType, NewAgent};
use swarmware_core::domain::app_state::{API_CALLS_SEED, SECURITY_ALERTS_SEED};
use swarmware_core::domain::repository::{
    AgentRepository, AppStateStore, ReadModifyFn, RepositoryError, SwarmRepository,
};
use swarmware_core::domain::swarm::{NewSwarm, SwarmStatus};
use swarmware_core::domain::user::UserId;
use swarmware_core::infrastructure::repositories::InMemoryStore;

fn owner() -> UserId {
    UserId::new("demo-user")
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

fn new_swarm(name: &str, status: SwarmStatus) -> NewSwarm {
    NewSwarm {
        name: name.to_string(),
        description: None,
        status,
        template_id: None,
        owner_id: owner(),
        agent_count: None,
        max_agents: 50,
        auto_scaling: true,
        security_config: None,
    }
}

async fn service_with(store: &Arc<InMemoryStore>) -> DashboardService {
    store.initialize_defaults(t0()).await.unwrap();
    DashboardService::new(store.clone(), store.clone(), store.clone())
}

#[tokio::test]
async fn live_aggregates_only_count_the_owners_active_swarms() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(&store).await;

    let active = SwarmRepository::create(&*store, new_swarm("Alpha", SwarmStatus::Active))
        .await
        .unwrap();
    SwarmRepository::create(&*store, new_swarm("Beta", SwarmStatus::Inactive))
        .await
        .unwrap();
    let mut other = new_swarm("Gamma", SwarmStatus::Active);
    other.owner_id = UserId::new("someone-else");
    SwarmRepository::create(&*store, other).await.unwrap();

    AgentRepository::create(
        &*store,
        NewAgent {
            name: "scanner".to_string(),
            agent_type: AgentType::Cybersecurity,
            status: AgentStatus::Active,
            swarm_id: active.id,
            config: None,
        },
    )
    .await
    .unwrap();

    let stats = service.stats_at(&owner(), t0()).await.unwrap();
    assert_eq!(stats.active_swarms, 1);
    assert_eq!(stats.total_agents, 1);
}

#[tokio::test]
async fn counters_are_stable_within_the_same_minute() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(&store).await;
    SwarmRepository::create(&*store, new_swarm("Alpha", SwarmStatus::Active))
        .await
        .unwrap();

    let first = service
        .stats_at(&owner(), t0() + Duration::seconds(10))
        .await
        .unwrap();
    let second = service
        .stats_at(&owner(), t0() + Duration::seconds(50))
        .await
        .unwrap();

    assert_eq!(first.api_calls, API_CALLS_SEED);
    assert_eq!(second.api_calls, first.api_calls);
    assert_eq!(first.security_alerts, SECURITY_ALERTS_SEED);
    assert_eq!(second.security_alerts, first.security_alerts);
}

#[tokio::test]
async fn api_calls_grow_after_sixty_five_minutes() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(&store).await;
    SwarmRepository::create(&*store, new_swarm("Alpha", SwarmStatus::Active))
        .await
        .unwrap();

    let before = service.stats_at(&owner(), t0()).await.unwrap();
    let after = service
        .stats_at(&owner(), t0() + Duration::minutes(65))
        .await
        .unwrap();

    assert!(after.api_calls > before.api_calls);
    // 1 active swarm, 65 minutes, 2..=8 calls per swarm-minute
    let growth = after.api_calls - before.api_calls;
    assert!(growth >= 2 * 65);
    assert!(growth <= 8 * 65);
}

#[tokio::test]
async fn api_calls_never_decrease_across_a_sequence() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(&store).await;
    SwarmRepository::create(&*store, new_swarm("Alpha", SwarmStatus::Active))
        .await
        .unwrap();
    SwarmRepository::create(&*store, new_swarm("Beta", SwarmStatus::Active))
        .await
        .unwrap();

    let mut previous = 0;
    for step in 0..12 {
        let stats = service
            .stats_at(&owner(), t0() + Duration::minutes(step * 3))
            .await
            .unwrap();
        assert!(stats.api_calls >= previous);
        previous = stats.api_calls;
    }
}

#[tokio::test]
async fn security_count_holds_then_redraws_into_range() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(&store).await;

    let inside = service
        .stats_at(&owner(), t0() + Duration::minutes(29))
        .await
        .unwrap();
    assert_eq!(inside.security_alerts, SECURITY_ALERTS_SEED);

    let redrawn = service
        .stats_at(&owner(), t0() + Duration::minutes(31))
        .await
        .unwrap();
    assert!((1..=5).contains(&redrawn.security_alerts));

    // and holds again for the next half hour
    let held = service
        .stats_at(&owner(), t0() + Duration::minutes(45))
        .await
        .unwrap();
    assert_eq!(held.security_alerts, redrawn.security_alerts);
}

/// State store that fails every operation, standing in for a broken
/// backing table.
struct FailingStateStore;

#[async_trait]
impl AppStateStore for FailingStateStore {
    async fn get(
        &self,
        _key: &str,
    ) -> Result<Option<swarmware_core::domain::app_state::AppStateEntry>, RepositoryError> {
        Err(RepositoryError::Database("state store offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<(), RepositoryError> {
        Err(RepositoryError::Database("state store offline".to_string()))
    }

    async fn initialize_defaults(&self, _now: DateTime<Utc>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Database("state store offline".to_string()))
    }

    async fn read_modify(
        &self,
        _counter_key: &str,
        _stamp_key: &str,
        _apply: ReadModifyFn,
    ) -> Result<Value, RepositoryError> {
        Err(RepositoryError::Database("state store offline".to_string()))
    }

    async fn increment_counter(&self, _key: &str, _delta: i64) -> Result<i64, RepositoryError> {
        Err(RepositoryError::Database("state store offline".to_string()))
    }
}

#[tokio::test]
async fn stats_degrade_to_seed_values_when_the_state_store_fails() {
    let store = Arc::new(InMemoryStore::new());
    SwarmRepository::create(&*store, new_swarm("Alpha", SwarmStatus::Active))
        .await
        .unwrap();

    let service = DashboardService::new(store.clone(), store.clone(), Arc::new(FailingStateStore));
    let stats = service.stats_at(&owner(), t0()).await.unwrap();

    assert_eq!(stats.active_swarms, 1);
    assert_eq!(stats.api_calls, API_CALLS_SEED);
    assert_eq!(stats.security_alerts, SECURITY_ALERTS_SEED);
}
