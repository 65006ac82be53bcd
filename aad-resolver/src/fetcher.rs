//! Asynchronous request primitive consumed by the engine
//!
//! The engine never blocks on a fetch: it spawns the request, returns, and
//! resumes inside the completion message. Implementations only perform the
//! lookup (and may pace requests through [`Fetcher::ready`]); timeouts and
//! completion delivery are handled by the engine.

use crate::model::EntityKind;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Fetch task ended without producing a result (aborted or panicked)
    #[error("Fetch cancelled")]
    Cancelled,
}

/// One lookup against the knowledge service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub kind: EntityKind,
    pub id: String,
}

impl FetchRequest {
    pub fn artist(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Artist,
            id: id.into(),
        }
    }

    pub fn area(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Area,
            id: id.into(),
        }
    }

    /// Scheduler task identifier, e.g. `Artist=<id>`
    pub fn task_id(&self) -> String {
        format!("{}={}", self.kind.task_label(), self.id)
    }

    pub fn description(&self) -> String {
        format!("Get info for {}: {}", self.kind, self.id)
    }
}

/// Knowledge-service lookup
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Wait until the next request may start
    ///
    /// The engine awaits this before starting the per-fetch timeout, so time
    /// spent queued behind a rate limit never counts against a lookup.
    async fn ready(&self) {}

    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError>;
}
