use async_trait::async_trait;
use thiserror::Error;

use super::types::{BackendResult, ConversationRequest};

/// Reasons a call ends as `BackendResult::TransportFailure`.
/// Never shown to the user; only logged.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned HTTP {status}")]
    Status { status: u16 },
    #[error("could not decode response body: {0}")]
    Decode(String),
    #[error("response body matched no known shape")]
    EmptyBody,
    #[error("response body populated more than one result shape")]
    AmbiguousBody,
}

/// Talks to the conversation backend.
///
/// Implementations perform a single attempt with no retry and no UI side
/// effects: every failure folds into `TransportFailure`.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn send(&self, request: &ConversationRequest) -> BackendResult;

    /// Liveness probe. `true` when the backend answered the health check.
    async fn health(&self) -> bool;
}
