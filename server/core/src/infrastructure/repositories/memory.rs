// In-memory repositories for development and testing.
//
// One store implements every repository trait behind a single mutex, which
// makes the multi-step operations (agent create + counter bump, state-store
// read-decide-write) trivially atomic - the same guarantees the Postgres
// implementations provide with transactions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::domain::agent::{Agent, AgentId, AgentUpdate, NewAgent};
use crate::domain::app_state::{default_entries, AppStateEntry};
use crate::domain::audit::{ApiCall, NewApiCall};
use crate::domain::repository::{
    AgentRepository, ApiCallRepository, AppStateStore, ReadModifyFn, RepositoryError,
    SecurityAlertRepository, SwarmRepository, TemplateRepository, UserRepository,
};
use crate::domain::security::{AlertId, NewSecurityAlert, SecurityAlert};
use crate::domain::swarm::{NewSwarm, Swarm, SwarmId, SwarmUpdate};
use crate::domain::template::{NewTemplate, Template, TemplateId};
use crate::domain::user::{UpsertUser, User, UserId};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    swarms: HashMap<SwarmId, Swarm>,
    agents: HashMap<AgentId, Agent>,
    templates: HashMap<TemplateId, Template>,
    alerts: HashMap<AlertId, SecurityAlert>,
    api_calls: Vec<ApiCall>,
    app_state: HashMap<String, AppStateEntry>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::Database("mutex poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn upsert(&self, user: UpsertUser) -> Result<User, RepositoryError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let row = state
            .users
            .entry(user.id.clone())
            .and_modify(|existing| {
                existing.email = user.email.clone();
                existing.display_name = user.display_name.clone();
                existing.role = user.role.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| User {
                id: user.id.clone(),
                email: user.email.clone(),
                display_name: user.display_name.clone(),
                role: user.role.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(row.clone())
    }
}

#[async_trait]
impl SwarmRepository for InMemoryStore {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Swarm>, RepositoryError> {
        let state = self.lock()?;
        let mut swarms: Vec<Swarm> = state
            .swarms
            .values()
            .filter(|s| &s.owner_id == owner)
            .cloned()
            .collect();
        swarms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(swarms)
    }

    async fn find_by_id(&self, id: SwarmId) -> Result<Option<Swarm>, RepositoryError> {
        Ok(self.lock()?.swarms.get(&id).cloned())
    }

    async fn create(&self, swarm: NewSwarm) -> Result<Swarm, RepositoryError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let row = Swarm {
            id: SwarmId::new(),
            name: swarm.name,
            description: swarm.description,
            status: swarm.status,
            template_id: swarm.template_id,
            owner_id: swarm.owner_id,
            agent_count: 0,
            max_agents: swarm.max_agents,
            auto_scaling: swarm.auto_scaling,
            security_config: swarm.security_config,
            created_at: now,
            updated_at: now,
        };
        state.swarms.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: SwarmId, updates: SwarmUpdate) -> Result<Swarm, RepositoryError> {
        let mut state = self.lock()?;
        let swarm = state
            .swarms
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound("swarm"))?;
        if let Some(name) = updates.name {
            swarm.name = name;
        }
        if let Some(description) = updates.description {
            swarm.description = Some(description);
        }
        if let Some(status) = updates.status {
            swarm.status = status;
        }
        if let Some(max_agents) = updates.max_agents {
            swarm.max_agents = max_agents;
        }
        if let Some(auto_scaling) = updates.auto_scaling {
            swarm.auto_scaling = auto_scaling;
        }
        if let Some(security_config) = updates.security_config {
            swarm.security_config = Some(security_config);
        }
        swarm.updated_at = Utc::now();
        Ok(swarm.clone())
    }

    async fn delete(&self, id: SwarmId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.swarms.remove(&id).is_some() {
            // cascade, mirroring the schema's ON DELETE rules
            state.agents.retain(|_, agent| agent.swarm_id != id);
            state.alerts.retain(|_, alert| alert.swarm_id != Some(id));
        }
        Ok(())
    }

    async fn count_active_for_owner(&self, owner: &UserId) -> Result<i64, RepositoryError> {
        use crate::domain::swarm::SwarmStatus;
        let state = self.lock()?;
        Ok(state
            .swarms
            .values()
            .filter(|s| &s.owner_id == owner && s.status == SwarmStatus::Active)
            .count() as i64)
    }
}

#[async_trait]
impl AgentRepository for InMemoryStore {
    async fn list_for_swarm(&self, swarm_id: SwarmId) -> Result<Vec<Agent>, RepositoryError> {
        let state = self.lock()?;
        let mut agents: Vec<Agent> = state
            .agents
            .values()
            .filter(|a| a.swarm_id == swarm_id)
            .cloned()
            .collect();
        agents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(agents)
    }

    async fn find_by_id(&self, id: AgentId) -> Result<Option<Agent>, RepositoryError> {
        Ok(self.lock()?.agents.get(&id).cloned())
    }

    async fn create(&self, agent: NewAgent) -> Result<Agent, RepositoryError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        {
            let swarm = state
                .swarms
                .get_mut(&agent.swarm_id)
                .ok_or(RepositoryError::NotFound("swarm"))?;
            swarm.agent_count += 1;
            swarm.updated_at = now;
        }
        let row = Agent {
            id: AgentId::new(),
            name: agent.name,
            agent_type: agent.agent_type,
            status: agent.status,
            swarm_id: agent.swarm_id,
            config: agent.config,
            last_heartbeat: None,
            created_at: now,
            updated_at: now,
        };
        state.agents.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: AgentId, updates: AgentUpdate) -> Result<Agent, RepositoryError> {
        let mut state = self.lock()?;
        let agent = state
            .agents
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound("agent"))?;
        if let Some(name) = updates.name {
            agent.name = name;
        }
        if let Some(agent_type) = updates.agent_type {
            agent.agent_type = agent_type;
        }
        if let Some(status) = updates.status {
            agent.status = status;
        }
        if let Some(config) = updates.config {
            agent.config = Some(config);
        }
        if let Some(heartbeat) = updates.last_heartbeat {
            agent.last_heartbeat = Some(heartbeat);
        }
        agent.updated_at = Utc::now();
        Ok(agent.clone())
    }

    async fn delete(&self, id: AgentId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if let Some(agent) = state.agents.remove(&id) {
            if let Some(swarm) = state.swarms.get_mut(&agent.swarm_id) {
                swarm.agent_count = (swarm.agent_count - 1).max(0);
                swarm.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn count_for_owner(&self, owner: &UserId) -> Result<i64, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .agents
            .values()
            .filter(|a| {
                state
                    .swarms
                    .get(&a.swarm_id)
                    .is_some_and(|s| &s.owner_id == owner)
            })
            .count() as i64)
    }
}

#[async_trait]
impl TemplateRepository for InMemoryStore {
    async fn list_public(&self) -> Result<Vec<Template>, RepositoryError> {
        let state = self.lock()?;
        let mut templates: Vec<Template> = state
            .templates
            .values()
            .filter(|t| t.is_public)
            .cloned()
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    async fn find_by_id(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError> {
        Ok(self.lock()?.templates.get(&id).cloned())
    }

    async fn create(&self, template: NewTemplate) -> Result<Template, RepositoryError> {
        let mut state = self.lock()?;
        let row = Template {
            id: TemplateId::new(),
            name: template.name,
            description: template.description,
            template_type: template.template_type,
            icon: template.icon,
            min_agents: template.min_agents,
            max_agents: template.max_agents,
            default_config: template.default_config,
            is_public: template.is_public,
            created_at: Utc::now(),
        };
        state.templates.insert(row.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl SecurityAlertRepository for InMemoryStore {
    async fn list_unresolved_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SecurityAlert>, RepositoryError> {
        let state = self.lock()?;
        let mut alerts: Vec<SecurityAlert> = state
            .alerts
            .values()
            .filter(|alert| {
                !alert.resolved
                    && alert
                        .swarm_id
                        .and_then(|sid| state.swarms.get(&sid))
                        .is_some_and(|s| &s.owner_id == owner)
            })
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    async fn create(&self, alert: NewSecurityAlert) -> Result<SecurityAlert, RepositoryError> {
        let mut state = self.lock()?;
        let row = SecurityAlert {
            id: AlertId::new(),
            title: alert.title,
            description: alert.description,
            severity: alert.severity,
            swarm_id: alert.swarm_id,
            agent_id: alert.agent_id,
            resolved: false,
            created_at: Utc::now(),
            resolved_at: None,
        };
        state.alerts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn resolve(&self, id: AlertId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if let Some(alert) = state.alerts.get_mut(&id) {
            if !alert.resolved {
                alert.resolved = true;
                alert.resolved_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ApiCallRepository for InMemoryStore {
    async fn log(&self, call: NewApiCall) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        state.api_calls.push(ApiCall {
            id: uuid::Uuid::new_v4(),
            endpoint: call.endpoint,
            method: call.method,
            user_id: call.user_id,
            swarm_id: call.swarm_id,
            response_time: call.response_time,
            status_code: call.status_code,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn count_since(&self, window_hours: i64) -> Result<i64, RepositoryError> {
        let cutoff = Utc::now() - Duration::hours(window_hours);
        let state = self.lock()?;
        Ok(state
            .api_calls
            .iter()
            .filter(|call| call.created_at >= cutoff)
            .count() as i64)
    }
}

#[async_trait]
impl AppStateStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<AppStateEntry>, RepositoryError> {
        Ok(self.lock()?.app_state.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        upsert_entry(&mut state.app_state, key, value);
        Ok(())
    }

    async fn initialize_defaults(&self, now: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        for (key, value) in default_entries(now) {
            state
                .app_state
                .entry(key.to_string())
                .or_insert_with(|| AppStateEntry {
                    key: key.to_string(),
                    value,
                    updated_at: now,
                });
        }
        Ok(())
    }

    async fn read_modify(
        &self,
        counter_key: &str,
        stamp_key: &str,
        apply: ReadModifyFn,
    ) -> Result<Value, RepositoryError> {
        let mut state = self.lock()?;
        let counter = state.app_state.get(counter_key).map(|e| e.value.clone());
        let stamp = state.app_state.get(stamp_key).map(|e| e.value.clone());
        let outcome = apply(counter, stamp);
        if let Some((counter_value, stamp_value)) = outcome.persist {
            upsert_entry(&mut state.app_state, counter_key, counter_value);
            upsert_entry(&mut state.app_state, stamp_key, stamp_value);
        }
        Ok(outcome.result)
    }

    async fn increment_counter(&self, key: &str, delta: i64) -> Result<i64, RepositoryError> {
        let mut state = self.lock()?;
        let current = state
            .app_state
            .get(key)
            .and_then(|e| e.value.as_i64())
            .unwrap_or(0);
        let next = current + delta;
        upsert_entry(&mut state.app_state, key, Value::from(next));
        Ok(next)
    }
}

fn upsert_entry(entries: &mut HashMap<String, AppStateEntry>, key: &str, value: Value) {
    let now = Utc::now();
    entries
        .entry(key.to_string())
        .and_modify(|entry| {
            entry.value = value.clone();
            entry.updated_at = now;
        })
        .or_insert_with(|| AppStateEntry {
            key: key.to_string(),
            value,
            updated_at: now,
        });
}
