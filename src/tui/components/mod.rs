//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: backend, status, liveness, unseen-content marker
//! - `MessageView`: one log entry (text, answer, options, map)
//! - `MapView`: braille map with numbered marker badges
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `InputBox`: single-line text entry
//! - `MessageList`: scrollable log with layout caching and hit testing
//! - `DetailOverlay`: the marker detail sheet
//!
//! Stateful components follow the persistent state + transient wrapper
//! pattern: the `...State` struct lives in `TuiState`, and a wrapper borrowing
//! it is created each frame.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── title_bar.rs       (Top status bar)
//! ├── message.rs         (Single entry renderer + hit-test geometry)
//! ├── message_list.rs    (Scrollable entry container)
//! ├── map_view.rs        (Map canvas)
//! ├── detail_overlay.rs  (Marker detail sheet)
//! └── input_box/         (Text input)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod detail_overlay;
pub mod input_box;
pub mod map_view;
pub mod message;
pub mod message_list;
pub use detail_overlay::{DetailOverlay, DetailOverlayState, OverlayEvent};
pub use input_box::{InputBox, InputEvent};
pub use message::MessageView;
pub use message_list::{MessageList, MessageListState};
