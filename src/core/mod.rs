//! # Core Application Logic
//!
//! This module contains farmabot's business logic.
//! It knows nothing about any specific UI technology or transport.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Session (dialog)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌──────────────┐
//!     │    TUI     │                          │ Conversation │
//!     │  Adapter   │                          │    client    │
//!     │ (ratatui)  │                          │  (reqwest)   │
//!     └────────────┘                          └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`]: The dialog state machine data and the quick options
//! - [`message`]: The append-only conversation log
//! - [`map`]: Viewport planning and marker projection for map results
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`config`]: Layered configuration

pub mod action;
pub mod config;
pub mod map;
pub mod message;
pub mod session;
pub mod state;
