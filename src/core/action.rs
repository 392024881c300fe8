//! # Actions
//!
//! Everything that can happen in farmabot becomes an `Action`.
//! User types a value? That's `Action::User(UserEvent::FreeText(..))`.
//! Backend responds? That's `Action::ResultReceived(result)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the `Effect` the adapter must carry out. No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! The `Processing` guard is the only concurrency control: every entry point
//! checks it before anything else, so at most one request is ever in flight.

use log::{debug, info, warn};

use crate::conversation::{BackendResult, ConversationRequest};
use crate::core::message::{Message, MessageContent, Role};
use crate::core::session::{
    GO_HOME_KEYWORD, HOME_OPTIONS, Intent, POST_SEARCH_OPTIONS, QuickOption, SessionState,
};
use crate::core::state::App;

pub const GREETING_PROMPT: &str = "Olá! Como posso ajudar?";
pub const HOME_PROMPT: &str = "Como posso ajudar?";
pub const AFTER_MAP_PROMPT: &str = "Deseja realizar outra busca?";
pub const AFTER_ANSWER_PROMPT: &str = "O que deseja fazer agora?";
pub const GUIDANCE: &str = "Por favor, selecione uma das opções abaixo para começar.";
pub const TRANSPORT_FAILURE: &str = "Desculpe, tive um problema ao consultar essas informações.";
pub const MAP_CAPTION: &str = "Encontrei os seguintes locais para retirada:";
pub const PICKUP_PROMPT: &str = "Digite o nome do medicamento para eu localizar:";

/// Input from the user, independent of how it was entered.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    FreeText(String),
    /// Label of a quick-option button.
    OptionSelected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Application start: reset the session and greet.
    Start,
    User(UserEvent),
    ResultReceived(BackendResult),
    HealthChecked(bool),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Issue exactly one backend call.
    SpawnRequest(ConversationRequest),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Start => {
            app.session.go_home();
            app.log.push(Message::options(GREETING_PROMPT, &HOME_OPTIONS));
            app.status_message = String::from("Pronto");
            Effect::None
        }
        Action::User(event) => {
            if app.session.is_processing() {
                debug!("Ignoring {:?} while a request is in flight", event);
                return Effect::None;
            }
            match event {
                UserEvent::FreeText(text) => submit_text(app, text),
                UserEvent::OptionSelected(label) => select_option(app, &label),
            }
        }
        Action::ResultReceived(result) => {
            if !app.session.is_processing() {
                warn!("Dropping result received outside Processing: {:?}", result);
                return Effect::None;
            }
            apply_result(app, result);
            Effect::None
        }
        Action::HealthChecked(online) => {
            if app.backend_online != Some(online) {
                info!("Backend is now {}", if online { "online" } else { "offline" });
            }
            app.backend_online = Some(online);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit_text(app: &mut App, text: String) -> Effect {
    let text = text.trim().to_string();
    if text.is_empty() {
        debug!("Ignoring empty submission");
        return Effect::None;
    }

    app.log.push(Message::user(text.clone()));

    if text.eq_ignore_ascii_case(GO_HOME_KEYWORD) {
        go_home(app);
        return Effect::None;
    }

    match (app.session.state, app.session.current_intent) {
        (SessionState::AwaitingValue, Some(intent)) => start_request(app, text, intent),
        (SessionState::FinishedSearch, _) => {
            app.log.push(Message::bot(GUIDANCE));
            app.log
                .push(Message::options(AFTER_ANSWER_PROMPT, &POST_SEARCH_OPTIONS));
            Effect::None
        }
        _ => {
            app.log.push(Message::bot(GUIDANCE));
            app.session.reset_to_choosing();
            app.log.push(Message::options(HOME_PROMPT, &HOME_OPTIONS));
            Effect::None
        }
    }
}

fn select_option(app: &mut App, label: &str) -> Effect {
    let Some(option) = QuickOption::from_label(label) else {
        debug!("Ignoring unknown option '{}'", label);
        return Effect::None;
    };
    if !app.session.accepts(option) {
        debug!(
            "Ignoring option {:?} in state {:?}",
            option, app.session.state
        );
        return Effect::None;
    }

    app.log.push(Message::user(option.label()));

    match option {
        QuickOption::GoHome => {
            go_home(app);
            Effect::None
        }
        QuickOption::LocatePickup => match app.session.last_search_term.clone() {
            Some(term) => {
                app.log.push(Message::bot(format!(
                    "Buscando pontos de retirada para: {term}..."
                )));
                start_request(app, term, Intent::LocatePharmacy)
            }
            None => {
                app.session.choose_intent(Intent::LocatePharmacy);
                app.log.push(Message::bot(PICKUP_PROMPT));
                Effect::None
            }
        },
        home => match home.intent() {
            Some(intent) => {
                info!("Intent selected: {}", intent.wire_name());
                app.session.choose_intent(intent);
                app.log.push(Message::bot(intent.prompt()));
                Effect::None
            }
            None => Effect::None,
        },
    }
}

fn start_request(app: &mut App, text: String, intent: Intent) -> Effect {
    info!("Submitting under intent '{}'", intent.wire_name());
    app.session.current_intent = Some(intent);
    app.session.begin_processing(text.clone());
    app.status_message = String::from("Consultando...");
    Effect::SpawnRequest(ConversationRequest::new(text, Some(intent)))
}

fn apply_result(app: &mut App, result: BackendResult) {
    let term = app.session.pending_term.take();
    app.status_message = String::from("Pronto");

    match result {
        BackendResult::Answer {
            text,
            latency,
            match_quality,
            matched_name,
        } => {
            info!("Answer received (latency={:?})", latency);
            app.log.push(Message {
                role: Role::Bot,
                content: MessageContent::AnsweredText {
                    body: text,
                    latency_seconds: latency,
                    match_quality,
                    matched_name,
                },
            });
            app.session.state = SessionState::FinishedSearch;
            app.session.last_search_term = term;
            app.log
                .push(Message::options(AFTER_ANSWER_PROMPT, &POST_SEARCH_OPTIONS));
        }
        BackendResult::GeoResult { markers, center } => {
            info!("Map result received with {} markers", markers.len());
            app.log.push(Message {
                role: Role::Bot,
                content: MessageContent::GeoResult {
                    caption: MAP_CAPTION.to_string(),
                    markers,
                    center,
                },
            });
            app.session.reset_to_choosing();
            app.log.push(Message::options(AFTER_MAP_PROMPT, &HOME_OPTIONS));
        }
        BackendResult::DomainError(code) => {
            info!("Backend reported {:?}", code);
            app.log.push(Message::bot(code.explanation()));
            reset(app);
        }
        BackendResult::TransportFailure => {
            app.log.push(Message::bot(TRANSPORT_FAILURE));
            app.status_message = String::from("Falha na consulta");
            reset(app);
        }
    }
}

/// Back to the home prompt after an error. Keeps the last search term.
fn reset(app: &mut App) {
    app.session.reset_to_choosing();
    app.log.push(Message::options(HOME_PROMPT, &HOME_OPTIONS));
}

fn go_home(app: &mut App) {
    info!("Returning home");
    app.session.go_home();
    app.log.push(Message::options(HOME_PROMPT, &HOME_OPTIONS));
}
