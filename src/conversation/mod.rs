pub mod client;
pub mod http;
pub mod types;

pub use client::{ClientError, ConversationClient};
pub use http::HttpConversationClient;
pub use types::{BackendResult, ConversationRequest, DomainErrorCode};
