// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

/// Smallest accepted agent capacity on swarms and templates.
pub const MIN_AGENT_CAPACITY: i32 = 1;

/// Largest accepted agent capacity on swarms and templates.
pub const MAX_AGENT_CAPACITY: i32 = 1000;

/// Input-shape failures. Surfaced as 400 responses at the API boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} name is required")]
    MissingName(&'static str),

    #[error("{field} must be between {MIN_AGENT_CAPACITY} and {MAX_AGENT_CAPACITY}, got {value}")]
    CapacityOutOfRange { field: &'static str, value: i32 },
}
