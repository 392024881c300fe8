//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::conversation::{BackendResult, ConversationClient, ConversationRequest};
use crate::core::state::App;

/// A client that answers every request with a fixed result and records what it was sent.
pub struct ScriptedClient {
    pub reply: BackendResult,
    pub online: bool,
    pub sent: Mutex<Vec<ConversationRequest>>,
}

impl ScriptedClient {
    pub fn replying(reply: BackendResult) -> Self {
        Self {
            reply,
            online: true,
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ConversationClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, request: &ConversationRequest) -> BackendResult {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }
        self.reply.clone()
    }

    async fn health(&self) -> bool {
        self.online
    }
}

/// Creates a test App whose client always fails at the transport level.
pub fn test_app() -> App {
    App::new(
        Arc::new(ScriptedClient::replying(BackendResult::TransportFailure)),
        "test-backend".to_string(),
    )
}
