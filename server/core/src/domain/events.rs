// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Change Notification Events
//!
//! Typed envelopes broadcast to every connected realtime client after a
//! mutating REST operation. The wire shape is `{"type": <kind>, "data": ..}`;
//! clients use the kind to decide which cached queries to refetch and must
//! never treat the payload as a source of truth.

use serde::{Deserialize, Serialize};

use crate::domain::agent::{Agent, AgentId};
use crate::domain::security::{AlertId, SecurityAlert};
use crate::domain::swarm::{Swarm, SwarmId};

/// Broadcast envelope. The closed set of kinds is part of the client
/// protocol; additions require a client-side mapping entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SwarmEvent {
    SwarmCreated(Swarm),
    SwarmUpdated(Swarm),
    SwarmDeleted { id: SwarmId },
    AgentCreated(Agent),
    AgentUpdated(Agent),
    AgentDeleted { id: AgentId },
    SecurityAlert(SecurityAlert),
    AlertResolved { id: AlertId },
}

impl SwarmEvent {
    /// Wire name of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SwarmEvent::SwarmCreated(_) => "swarm_created",
            SwarmEvent::SwarmUpdated(_) => "swarm_updated",
            SwarmEvent::SwarmDeleted { .. } => "swarm_deleted",
            SwarmEvent::AgentCreated(_) => "agent_created",
            SwarmEvent::AgentUpdated(_) => "agent_updated",
            SwarmEvent::AgentDeleted { .. } => "agent_deleted",
            SwarmEvent::SecurityAlert(_) => "security_alert",
            SwarmEvent::AlertResolved { .. } => "alert_resolved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::domain::swarm::SwarmStatus;
    use crate::domain::user::UserId;

    fn sample_swarm() -> Swarm {
        Swarm {
            id: SwarmId::new(),
            name: "Alpha".to_string(),
            description: None,
            status: SwarmStatus::Active,
            template_id: None,
            owner_id: UserId::new("demo-user"),
            agent_count: 0,
            max_agents: 50,
            auto_scaling: true,
            security_config: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn envelope_carries_type_and_data() {
        let swarm = sample_swarm();
        let value = serde_json::to_value(SwarmEvent::SwarmCreated(swarm.clone())).unwrap();
        assert_eq!(value["type"], "swarm_created");
        assert_eq!(value["data"]["name"], "Alpha");
        assert_eq!(value["data"]["ownerId"], "demo-user");
    }

    #[test]
    fn deleted_envelope_carries_only_the_id() {
        let id = SwarmId::new();
        let value = serde_json::to_value(SwarmEvent::SwarmDeleted { id }).unwrap();
        assert_eq!(value["type"], "swarm_deleted");
        assert_eq!(value["data"], json!({ "id": id.0 }));
    }

    #[test]
    fn kind_matches_serialized_tag() {
        let events = vec![
            SwarmEvent::SwarmCreated(sample_swarm()),
            SwarmEvent::SwarmUpdated(sample_swarm()),
            SwarmEvent::SwarmDeleted { id: SwarmId::new() },
            SwarmEvent::AgentDeleted { id: AgentId::new() },
            SwarmEvent::AlertResolved { id: AlertId::new() },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.kind());
        }
    }
}
