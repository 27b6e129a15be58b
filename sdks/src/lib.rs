/// SwarmWare Rust SDK
///
/// Typed client for the SwarmWare dashboard API, plus the client side of
/// the realtime change-notification protocol (envelope decoding, query
/// invalidation, reconnect policy).

pub mod client;
pub mod realtime;

pub use client::SwarmWareClient;
pub use realtime::{Envelope, EventKind, QueryCache, QueryKey, ReconnectPolicy};
