// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Realtime Channel
//!
//! WebSocket endpoint at `/ws`. Each connection holds one event-bus
//! receiver and gets every envelope published after it subscribed, in
//! publish order. There is no delivery guarantee and no replay: a client
//! that was disconnected re-synchronizes over REST. Inbound frames are
//! logged and otherwise ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::infrastructure::event_bus::EventBusError;
use crate::presentation::api::AppContext;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<AppContext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, ctx))
}

async fn handle_socket(socket: WebSocket, ctx: AppContext) {
    debug!("realtime client connected");
    let (mut sender, mut receiver) = socket.split();
    let mut events = ctx.events.subscribe();

    // forward every broadcast envelope to this client until the transport
    // drops; a lagged receiver skips ahead, clients recover over REST
    let send_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to serialize event envelope");
                    }
                },
                Err(EventBusError::Lagged(skipped)) => {
                    warn!(skipped, "realtime client lagged behind the event bus");
                }
                Err(_) => break,
            }
        }
    });

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => debug!(%text, "ignoring inbound realtime message"),
            Message::Close(_) => break,
            _ => {}
        }
    }

    // dropping the receiver unregisters this connection from the bus
    send_task.abort();
    debug!("realtime client disconnected");
}
