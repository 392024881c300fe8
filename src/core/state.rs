//! # Application State
//!
//! Core business state for farmabot. Domain logic only, no TUI types.
//! Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── client: Arc<dyn ConversationClient>  // backend access
//! ├── session: Session                     // dialog state machine data
//! ├── log: MessageLog                      // append-only conversation
//! ├── status_message: String               // status bar text
//! ├── backend_label: String                // where requests go
//! └── backend_online: Option<bool>         // last liveness probe result
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::conversation::ConversationClient;
use crate::core::message::MessageLog;
use crate::core::session::Session;

pub struct App {
    pub client: Arc<dyn ConversationClient>,
    pub session: Session,
    pub log: MessageLog,
    pub status_message: String,
    pub backend_label: String,
    /// `None` until the first probe reports (or when probing is disabled).
    pub backend_online: Option<bool>,
}

impl App {
    pub fn new(client: Arc<dyn ConversationClient>, backend_label: String) -> Self {
        Self {
            client,
            session: Session::new(),
            log: MessageLog::new(),
            status_message: String::new(),
            backend_label,
            backend_online: None,
        }
    }
}
