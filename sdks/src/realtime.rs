// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Realtime Protocol — Client Side
//!
//! The server broadcasts thin `{"type": .., "data": ..}` envelopes after
//! every mutation. A client never trusts the payload; it maps the kind to
//! the set of cached queries that just went stale and refetches them over
//! REST. This module implements that contract plus the reconnect policy:
//! after a transport drop the client backs off exponentially and, once
//! reconnected, marks every query stale so the first action is a full
//! refetch (events missed while offline are gone for good).

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of broadcast kinds. Must match the server's envelope tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SwarmCreated,
    SwarmUpdated,
    SwarmDeleted,
    AgentCreated,
    AgentUpdated,
    AgentDeleted,
    SecurityAlert,
    AlertResolved,
}

/// A decoded broadcast envelope. The payload stays opaque JSON on purpose:
/// it is a hint, not state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub data: Value,
}

/// Cached queries a dashboard view may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Swarms,
    SecurityAlerts,
    DashboardStats,
}

impl QueryKey {
    /// REST endpoint that rebuilds this query from scratch.
    pub fn endpoint(&self) -> &'static str {
        match self {
            QueryKey::Swarms => "/api/swarms",
            QueryKey::SecurityAlerts => "/api/security/alerts",
            QueryKey::DashboardStats => "/api/dashboard/stats",
        }
    }

    pub const ALL: [QueryKey; 3] = [
        QueryKey::Swarms,
        QueryKey::SecurityAlerts,
        QueryKey::DashboardStats,
    ];
}

/// Queries invalidated by one event kind.
///
/// Swarm events touch the swarm list and the headline numbers; agent events
/// only move the headline numbers (agent lists are fetched per swarm on
/// navigation); alert events touch the alert list and the headline numbers.
pub fn invalidated_by(kind: EventKind) -> &'static [QueryKey] {
    match kind {
        EventKind::SwarmCreated | EventKind::SwarmUpdated | EventKind::SwarmDeleted => {
            &[QueryKey::Swarms, QueryKey::DashboardStats]
        }
        EventKind::AgentCreated | EventKind::AgentUpdated | EventKind::AgentDeleted => {
            &[QueryKey::DashboardStats]
        }
        EventKind::SecurityAlert | EventKind::AlertResolved => {
            &[QueryKey::SecurityAlerts, QueryKey::DashboardStats]
        }
    }
}

/// Tracks which cached queries are stale. Views drain the stale set and
/// refetch each key's endpoint in the background.
#[derive(Debug, Default)]
pub struct QueryCache {
    stale: HashSet<QueryKey>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one raw frame off the wire and apply it. Unknown kinds fail
    /// decoding and are ignored by the caller.
    pub fn apply_raw(&mut self, frame: &str) -> Result<EventKind, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(frame)?;
        self.apply(&envelope);
        Ok(envelope.kind)
    }

    /// Mark every query the envelope's kind invalidates as stale.
    pub fn apply(&mut self, envelope: &Envelope) {
        for key in invalidated_by(envelope.kind) {
            self.stale.insert(*key);
        }
    }

    /// Everything is stale. Used right after a reconnect, when an unknown
    /// number of events was missed.
    pub fn mark_all_stale(&mut self) {
        self.stale.extend(QueryKey::ALL);
    }

    pub fn is_stale(&self, key: QueryKey) -> bool {
        self.stale.contains(&key)
    }

    /// Drain the stale set, handing the caller the keys to refetch.
    pub fn take_stale(&mut self) -> Vec<QueryKey> {
        self.stale.drain().collect()
    }
}

/// Capped exponential backoff for re-establishing the realtime transport.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl ReconnectPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempt: 0,
        }
    }

    /// Delay before the next connection attempt: `base * 2^attempt`, capped.
    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u32 << self.attempt.min(16);
        let delay = self.base.saturating_mul(factor).min(self.max);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Call after a successful reconnect; the next drop starts over from
    /// the base delay.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn swarm_events_invalidate_swarms_and_stats() {
        for kind in [
            EventKind::SwarmCreated,
            EventKind::SwarmUpdated,
            EventKind::SwarmDeleted,
        ] {
            assert_eq!(
                invalidated_by(kind),
                &[QueryKey::Swarms, QueryKey::DashboardStats]
            );
        }
    }

    #[test]
    fn agent_events_only_invalidate_stats() {
        for kind in [
            EventKind::AgentCreated,
            EventKind::AgentUpdated,
            EventKind::AgentDeleted,
        ] {
            assert_eq!(invalidated_by(kind), &[QueryKey::DashboardStats]);
        }
    }

    #[test]
    fn alert_events_invalidate_alerts_and_stats() {
        for kind in [EventKind::SecurityAlert, EventKind::AlertResolved] {
            assert_eq!(
                invalidated_by(kind),
                &[QueryKey::SecurityAlerts, QueryKey::DashboardStats]
            );
        }
    }

    #[test]
    fn envelope_decodes_the_server_wire_shape() {
        let frame = json!({
            "type": "security_alert",
            "data": { "id": "4be0643f-1d98-573b-97cd-ca98a65347dd", "severity": "high" }
        })
        .to_string();

        let mut cache = QueryCache::new();
        let kind = cache.apply_raw(&frame).unwrap();
        assert_eq!(kind, EventKind::SecurityAlert);
        assert!(cache.is_stale(QueryKey::SecurityAlerts));
        assert!(cache.is_stale(QueryKey::DashboardStats));
        assert!(!cache.is_stale(QueryKey::Swarms));
    }

    #[test]
    fn unknown_kinds_are_rejected_not_misrouted() {
        let mut cache = QueryCache::new();
        assert!(cache.apply_raw(r#"{"type":"totally_new","data":{}}"#).is_err());
        assert!(cache.take_stale().is_empty());
    }

    #[test]
    fn take_stale_drains_the_set() {
        let mut cache = QueryCache::new();
        cache.apply(&Envelope {
            kind: EventKind::SwarmCreated,
            data: Value::Null,
        });
        let mut stale = cache.take_stale();
        stale.sort_by_key(|k| k.endpoint());
        assert_eq!(stale.len(), 2);
        assert!(cache.take_stale().is_empty());
    }

    #[test]
    fn reconnect_backs_off_exponentially_and_caps() {
        let mut policy = ReconnectPolicy::new(Duration::from_millis(500), Duration::from_secs(4));
        assert_eq!(policy.next_delay(), Duration::from_millis(500));
        assert_eq!(policy.next_delay(), Duration::from_secs(1));
        assert_eq!(policy.next_delay(), Duration::from_secs(2));
        assert_eq!(policy.next_delay(), Duration::from_secs(4));
        assert_eq!(policy.next_delay(), Duration::from_secs(4));

        policy.reset();
        assert_eq!(policy.next_delay(), Duration::from_millis(500));
    }

    #[test]
    fn reconnect_marks_every_query_stale() {
        let mut cache = QueryCache::new();
        cache.mark_all_stale();
        for key in QueryKey::ALL {
            assert!(cache.is_stale(key));
        }
    }
}
