//! reqwest-backed client for the chat and health endpoints.

use async_trait::async_trait;
use log::{debug, info, warn};

use super::client::{ClientError, ConversationClient};
use super::types::{BackendResult, ConversationRequest, RawResponse, Unclassifiable};
use crate::core::config::ResolvedConfig;

pub struct HttpConversationClient {
    chat_url: String,
    health_url: String,
    client: reqwest::Client,
}

impl HttpConversationClient {
    pub fn new(base_url: &str, chat_path: &str, health_path: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            chat_url: format!("{}{}", base, normalize_path(chat_path)),
            health_url: format!("{}{}", base, normalize_path(health_path)),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(&config.base_url, &config.chat_path, &config.health_path)
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    async fn try_send(&self, request: &ConversationRequest) -> Result<BackendResult, ClientError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        debug!("Chat response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
            });
        }

        let raw: RawResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        raw.classify().map_err(|reason| match reason {
            Unclassifiable::Empty => ClientError::EmptyBody,
            Unclassifiable::Ambiguous => ClientError::AmbiguousBody,
        })
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[async_trait]
impl ConversationClient for HttpConversationClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, request: &ConversationRequest) -> BackendResult {
        info!(
            "Chat request: intent={:?}, text_len={}",
            request.intent.map(|i| i.wire_name()),
            request.text.len()
        );
        match self.try_send(request).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Chat request failed: {}", e);
                BackendResult::TransportFailure
            }
        }
    }

    async fn health(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => {
                debug!("Health check status: {}", response.status());
                response.status().is_success()
            }
            Err(e) => {
                debug!("Health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_without_double_slash() {
        let client = HttpConversationClient::new("http://localhost:8000/", "chat", "/health");
        assert_eq!(client.chat_url(), "http://localhost:8000/chat");
        assert_eq!(client.health_url, "http://localhost:8000/health");
    }
}
