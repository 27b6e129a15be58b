// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use reqwest::Client;

use swarmware_core::application::dashboard::DashboardStats;
use swarmware_core::domain::agent::{Agent, AgentId, AgentUpdate, NewAgent};
use swarmware_core::domain::security::{AlertId, NewSecurityAlert, SecurityAlert};
use swarmware_core::domain::swarm::{NewSwarm, Swarm, SwarmId, SwarmUpdate};
use swarmware_core::domain::template::{NewTemplate, Template, TemplateId};
use swarmware_core::domain::user::UserId;

/// Client for the SwarmWare dashboard API.
///
/// Every method maps to one REST endpoint. The realtime channel is not a
/// source of truth: on any invalidation hint (see `crate::realtime`) the
/// corresponding read method here reconstructs correct state.
pub struct SwarmWareClient {
    base_url: String,
    client: Client,
}

impl SwarmWareClient {
    /// Create a new client for the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    // ── Dashboard ────────────────────────────────────────────────────────

    pub async fn dashboard_stats(&self, user_id: &UserId) -> Result<DashboardStats> {
        let url = format!("{}/api/dashboard/stats", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    // ── Swarms ───────────────────────────────────────────────────────────

    pub async fn swarms(&self, user_id: &UserId) -> Result<Vec<Swarm>> {
        let url = format!("{}/api/swarms", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn swarm(&self, id: SwarmId) -> Result<Swarm> {
        let url = format!("{}/api/swarms/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn create_swarm(&self, swarm: &NewSwarm) -> Result<Swarm> {
        let url = format!("{}/api/swarms", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(swarm)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn update_swarm(&self, id: SwarmId, updates: &SwarmUpdate) -> Result<Swarm> {
        let url = format!("{}/api/swarms/{}", self.base_url, id);
        let response = self
            .client
            .put(&url)
            .json(updates)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn delete_swarm(&self, id: SwarmId) -> Result<()> {
        let url = format!("{}/api/swarms/{}", self.base_url, id);
        self.client.delete(&url).send().await?.error_for_status()?;
        Ok(())
    }

    // ── Agents ───────────────────────────────────────────────────────────

    pub async fn agents(&self, swarm_id: SwarmId) -> Result<Vec<Agent>> {
        let url = format!("{}/api/swarms/{}/agents", self.base_url, swarm_id);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn create_agent(&self, agent: &NewAgent) -> Result<Agent> {
        let url = format!("{}/api/agents", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(agent)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn update_agent(&self, id: AgentId, updates: &AgentUpdate) -> Result<Agent> {
        let url = format!("{}/api/agents/{}", self.base_url, id);
        let response = self
            .client
            .put(&url)
            .json(updates)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn delete_agent(&self, id: AgentId) -> Result<()> {
        let url = format!("{}/api/agents/{}", self.base_url, id);
        self.client.delete(&url).send().await?.error_for_status()?;
        Ok(())
    }

    // ── Templates ────────────────────────────────────────────────────────

    pub async fn templates(&self) -> Result<Vec<Template>> {
        let url = format!("{}/api/templates", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn template(&self, id: TemplateId) -> Result<Template> {
        let url = format!("{}/api/templates/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn create_template(&self, template: &NewTemplate) -> Result<Template> {
        let url = format!("{}/api/templates", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(template)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    // ── Security ─────────────────────────────────────────────────────────

    pub async fn security_alerts(&self, user_id: &UserId) -> Result<Vec<SecurityAlert>> {
        let url = format!("{}/api/security/alerts", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn create_security_alert(&self, alert: &NewSecurityAlert) -> Result<SecurityAlert> {
        let url = format!("{}/api/security/alerts", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(alert)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn resolve_security_alert(&self, id: AlertId) -> Result<()> {
        let url = format!("{}/api/security/alerts/{}/resolve", self.base_url, id);
        self.client.put(&url).send().await?.error_for_status()?;
        Ok(())
    }

    // ── Monitoring ───────────────────────────────────────────────────────

    pub async fn heartbeat(&self) -> Result<serde_json::Value> {
        let url = format!("{}/api/monitoring/heartbeat", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
