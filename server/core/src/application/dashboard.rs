// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Dashboard Statistics Engine
//!
//! Computes the four headline numbers shown on the dashboard. Two are live
//! aggregates (active swarms, total agents); two are driven by a
//! time-bucketed synthetic growth model persisted in the app-state store so
//! the dashboard keeps "moving" across restarts even with no real traffic.
//!
//! The two simulated counters follow different disciplines and must stay
//! separate:
//!
//! - the API-call total only ever grows: once per elapsed minute it gains
//!   `active_swarms * uniform(2..=8)` per minute;
//! - the security-alert count is redrawn from `uniform(1..=5)` every 30
//!   minutes and may go down.
//!
//! Both read-decide-write sequences run inside `AppStateStore::read_modify`
//! under row locks, so concurrent dashboard loads cannot double-apply
//! growth. All clock math takes `now` as a parameter; `stats_at` is the
//! test seam for a simulated clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::app_state::{
    keys, parse_stamp, API_CALLS_SEED, SECURITY_ALERTS_SEED,
};
use crate::domain::repository::{
    AgentRepository, AppStateStore, ReadModifyOutcome, RepositoryError, SwarmRepository,
};
use crate::domain::user::UserId;

/// The dashboard's headline statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_swarms: i64,
    pub total_agents: i64,
    pub security_alerts: i64,
    pub api_calls: i64,
}

pub struct DashboardService {
    swarms: Arc<dyn SwarmRepository>,
    agents: Arc<dyn AgentRepository>,
    state: Arc<dyn AppStateStore>,
}

impl DashboardService {
    pub fn new(
        swarms: Arc<dyn SwarmRepository>,
        agents: Arc<dyn AgentRepository>,
        state: Arc<dyn AppStateStore>,
    ) -> Self {
        Self {
            swarms,
            agents,
            state,
        }
    }

    pub async fn stats(&self, user_id: &UserId) -> Result<DashboardStats, RepositoryError> {
        self.stats_at(user_id, Utc::now()).await
    }

    /// Compute the stats as of `now`. Live aggregates are always fresh;
    /// failures reading them fail the request. The simulated counters are
    /// best-effort and degrade to their seed values when the state store is
    /// unavailable.
    pub async fn stats_at(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, RepositoryError> {
        let active_swarms = self.swarms.count_active_for_owner(user_id).await?;
        let total_agents = self.agents.count_for_owner(user_id).await?;

        let api_calls = self.advance_api_calls(now, active_swarms).await;
        let security_alerts = self.refresh_security_alerts(now).await;

        Ok(DashboardStats {
            active_swarms,
            total_agents,
            security_alerts,
            api_calls,
        })
    }

    async fn advance_api_calls(&self, now: DateTime<Utc>, active_swarms: i64) -> i64 {
        let per_swarm_rate = rand::rng().random_range(2..=8);
        let outcome = self
            .state
            .read_modify(
                keys::API_CALLS_TOTAL,
                keys::LAST_API_CALL_UPDATE,
                Box::new(move |counter, stamp| {
                    decide_api_call_growth(counter, stamp, now, active_swarms, per_swarm_rate)
                }),
            )
            .await;

        match outcome {
            Ok(value) => value.as_i64().unwrap_or(API_CALLS_SEED),
            Err(err) => {
                warn!(error = %err, "api-call counter unavailable, reporting seed value");
                API_CALLS_SEED
            }
        }
    }

    async fn refresh_security_alerts(&self, now: DateTime<Utc>) -> i64 {
        let redraw = rand::rng().random_range(1..=5);
        let outcome = self
            .state
            .read_modify(
                keys::SECURITY_ALERTS_COUNT,
                keys::LAST_SECURITY_UPDATE,
                Box::new(move |counter, stamp| {
                    decide_security_redraw(counter, stamp, now, redraw)
                }),
            )
            .await;

        match outcome {
            Ok(value) => value.as_i64().unwrap_or(SECURITY_ALERTS_SEED),
            Err(err) => {
                warn!(error = %err, "security-alert counter unavailable, reporting seed value");
                SECURITY_ALERTS_SEED
            }
        }
    }
}

/// Growth decision for the simulated API-call total.
///
/// One whole elapsed minute is the growth bucket; partial minutes leave the
/// counter untouched and do not advance the stamp, so sub-minute callers
/// all observe the same value. An absent or malformed stamp counts as "just
/// updated".
pub(crate) fn decide_api_call_growth(
    counter: Option<Value>,
    stamp: Option<Value>,
    now: DateTime<Utc>,
    active_swarms: i64,
    per_swarm_rate: i64,
) -> ReadModifyOutcome {
    let total = counter.as_ref().and_then(Value::as_i64).unwrap_or(API_CALLS_SEED);
    let last_update = parse_stamp(stamp.as_ref()).unwrap_or(now);
    let minutes_passed = (now - last_update).num_minutes();

    if minutes_passed >= 1 {
        let growth = active_swarms.max(1) * per_swarm_rate * minutes_passed;
        let new_total = total + growth;
        ReadModifyOutcome {
            persist: Some((json!(new_total), json!(now.to_rfc3339()))),
            result: json!(new_total),
        }
    } else {
        ReadModifyOutcome {
            persist: None,
            result: json!(total),
        }
    }
}

/// Redraw decision for the simulated security-alert count. Unlike the
/// API-call total this is not monotone: every 30 minutes the count is
/// replaced wholesale by a fresh draw.
pub(crate) fn decide_security_redraw(
    counter: Option<Value>,
    stamp: Option<Value>,
    now: DateTime<Utc>,
    redraw: i64,
) -> ReadModifyOutcome {
    let current = counter.as_ref().and_then(Value::as_i64).unwrap_or(SECURITY_ALERTS_SEED);
    let last_update = parse_stamp(stamp.as_ref()).unwrap_or(now);

    if now - last_update >= Duration::minutes(30) {
        ReadModifyOutcome {
            persist: Some((json!(redraw), json!(now.to_rfc3339()))),
            result: json!(redraw),
        }
    } else {
        ReadModifyOutcome {
            persist: None,
            result: json!(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, minute, 0).unwrap()
    }

    fn stamp(t: DateTime<Utc>) -> Option<Value> {
        Some(json!(t.to_rfc3339()))
    }

    #[test]
    fn growth_waits_for_a_whole_minute() {
        let outcome = decide_api_call_growth(
            Some(json!(1500)),
            stamp(at(0)),
            at(0) + Duration::seconds(59),
            3,
            5,
        );
        assert!(outcome.persist.is_none());
        assert_eq!(outcome.result, json!(1500));
    }

    #[test]
    fn growth_is_rate_times_swarms_times_minutes() {
        let outcome = decide_api_call_growth(Some(json!(1500)), stamp(at(0)), at(7), 3, 5);
        // 3 swarms * 5/minute * 7 minutes
        assert_eq!(outcome.result, json!(1500 + 105));
        let (counter, new_stamp) = outcome.persist.unwrap();
        assert_eq!(counter, json!(1605));
        assert_eq!(parse_stamp(Some(&new_stamp)).unwrap(), at(7));
    }

    #[test]
    fn growth_never_decreases_over_a_sequence() {
        let mut counter = json!(API_CALLS_SEED);
        let mut stamp_value = json!(at(0).to_rfc3339());
        let mut previous = API_CALLS_SEED;

        for step in 1..=10u32 {
            let outcome = decide_api_call_growth(
                Some(counter.clone()),
                Some(stamp_value.clone()),
                at(step * 2),
                2,
                4,
            );
            let value = outcome.result.as_i64().unwrap();
            assert!(value >= previous);
            previous = value;
            if let Some((c, s)) = outcome.persist {
                counter = c;
                stamp_value = s;
            }
        }
    }

    #[test]
    fn growth_bounds_hold_for_any_draw() {
        let active = 4;
        let minutes = 9;
        for rate in 2..=8 {
            let outcome =
                decide_api_call_growth(Some(json!(0)), stamp(at(0)), at(minutes as u32), active, rate);
            let grown = outcome.result.as_i64().unwrap();
            assert!(grown >= 2 * active * minutes);
            assert!(grown <= 8 * active * minutes);
        }
    }

    #[test]
    fn zero_active_swarms_still_grows_at_floor_rate() {
        let outcome = decide_api_call_growth(Some(json!(100)), stamp(at(0)), at(1), 0, 2);
        assert_eq!(outcome.result, json!(102));
    }

    #[test]
    fn missing_counter_falls_back_to_seed() {
        let outcome = decide_api_call_growth(None, stamp(at(0)), at(1), 1, 3);
        assert_eq!(outcome.result, json!(API_CALLS_SEED + 3));
    }

    #[test]
    fn missing_stamp_means_no_growth() {
        let outcome = decide_api_call_growth(Some(json!(1700)), None, at(45), 5, 8);
        assert!(outcome.persist.is_none());
        assert_eq!(outcome.result, json!(1700));
    }

    #[test]
    fn redraw_holds_inside_the_window() {
        let outcome = decide_security_redraw(Some(json!(4)), stamp(at(0)), at(29), 1);
        assert!(outcome.persist.is_none());
        assert_eq!(outcome.result, json!(4));
    }

    #[test]
    fn redraw_replaces_after_thirty_minutes() {
        for draw in 1..=5 {
            let outcome = decide_security_redraw(Some(json!(4)), stamp(at(0)), at(30), draw);
            assert_eq!(outcome.result, json!(draw));
            let (counter, _) = outcome.persist.unwrap();
            assert_eq!(counter, json!(draw));
        }
    }

    #[test]
    fn redraw_may_decrease_the_count() {
        let outcome = decide_security_redraw(Some(json!(5)), stamp(at(0)), at(31), 1);
        assert_eq!(outcome.result, json!(1));
    }
}
