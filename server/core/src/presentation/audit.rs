// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # API-Call Audit Middleware
//!
//! Appends one `api_calls` row per `/api` request after the response is
//! produced. Auditing is best-effort: a failed insert is logged and never
//! fails the request it describes.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::domain::audit::NewApiCall;
use crate::domain::user::UserId;
use crate::presentation::api::AppContext;

pub async fn record_api_call(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request.uri().path().to_string();
    if !endpoint.starts_with("/api") {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let user_id = request.uri().query().and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "userId")
            .map(|(_, value)| UserId::new(value.into_owned()))
    });

    let started = Instant::now();
    let response = next.run(request).await;

    metrics::counter!("swarmware_api_requests_total").increment(1);

    let record = NewApiCall {
        endpoint,
        method,
        user_id,
        swarm_id: None,
        response_time: Some(started.elapsed().as_millis().min(i32::MAX as u128) as i32),
        status_code: Some(i32::from(response.status().as_u16())),
    };
    if let Err(err) = ctx.api_calls.log(record).await {
        warn!(error = %err, "failed to record api call");
    }

    response
}
