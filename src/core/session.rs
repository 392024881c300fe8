//! # Dialog Session
//!
//! The one piece of conversational state: where the dialog is, which intent
//! the next free-text value belongs to, and the last term that produced an
//! answer.
//!
//! ```text
//!                 option                text
//! ChoosingOption ───────► AwaitingValue ──────► Processing
//!       ▲                                          │
//!       │          map / error / failure           │ answer
//!       ├──────────────────────────────────────────┤
//!       │                                          ▼
//!       └─────────────── "Voltar" ─────────── FinishedSearch
//! ```
//!
//! Transitions are applied by `update()` in action.rs. This module only
//! defines the vocabulary and the guards.

use serde::{Serialize, Serializer};

/// Reserved keyword that returns to the home prompt from any idle state.
pub const GO_HOME_KEYWORD: &str = "voltar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Initial/reset state. Only a quick option moves the dialog forward.
    #[default]
    ChoosingOption,
    /// An intent was picked; the next free text goes to the backend.
    AwaitingValue,
    /// A request is in flight. Everything else is ignored until it resolves.
    Processing,
    /// An answer was shown; offers a pickup search or going home.
    FinishedSearch,
}

/// Category of backend query attached to a free-text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    LocatePharmacy,
    LookupByDiagnosisCode,
    LookupByMedicationName,
}

/// Serializes as its `wire_name()`.
impl Serialize for Intent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl Intent {
    /// Value sent in the `intent` field of the chat request.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Intent::LocatePharmacy => "onde retirar medicamento",
            Intent::LookupByDiagnosisCode => "cid",
            Intent::LookupByMedicationName => "medicamento",
        }
    }

    /// Bot prompt asking for the value this intent needs.
    pub fn prompt(&self) -> &'static str {
        match self {
            Intent::LocatePharmacy => {
                "Certo! Digite o nome do medicamento para eu localizar as farmácias:"
            }
            Intent::LookupByDiagnosisCode => "Ok! Qual o código CID?",
            Intent::LookupByMedicationName => {
                "Qual o nome do medicamento para eu buscar as informações?"
            }
        }
    }
}

/// A predefined action offered as a button instead of free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickOption {
    LocatePharmacy,
    DiagnosisCodeInfo,
    MedicationInfo,
    LocatePickup,
    GoHome,
}

/// Options offered at start and after every reset.
pub const HOME_OPTIONS: [QuickOption; 3] = [
    QuickOption::LocatePharmacy,
    QuickOption::DiagnosisCodeInfo,
    QuickOption::MedicationInfo,
];

/// Options offered after an answer was rendered.
pub const POST_SEARCH_OPTIONS: [QuickOption; 2] = [QuickOption::LocatePickup, QuickOption::GoHome];

impl QuickOption {
    pub fn label(&self) -> &'static str {
        match self {
            QuickOption::LocatePharmacy => "Onde retirar Medicamento",
            QuickOption::DiagnosisCodeInfo => "Informações com CID",
            QuickOption::MedicationInfo => "Informações com Medicamento",
            QuickOption::LocatePickup => "Onde Retirar?",
            QuickOption::GoHome => "Voltar",
        }
    }

    /// Parses a button label back into an option. Surrounding whitespace is ignored,
    /// and "voltar" matches regardless of case.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case(GO_HOME_KEYWORD) {
            return Some(QuickOption::GoHome);
        }
        [
            QuickOption::LocatePharmacy,
            QuickOption::DiagnosisCodeInfo,
            QuickOption::MedicationInfo,
            QuickOption::LocatePickup,
        ]
        .into_iter()
        .find(|option| option.label() == label)
    }

    /// The intent a home option selects, if any.
    pub fn intent(&self) -> Option<Intent> {
        match self {
            QuickOption::LocatePharmacy => Some(Intent::LocatePharmacy),
            QuickOption::DiagnosisCodeInfo => Some(Intent::LookupByDiagnosisCode),
            QuickOption::MedicationInfo => Some(Intent::LookupByMedicationName),
            QuickOption::LocatePickup | QuickOption::GoHome => None,
        }
    }
}

pub fn labels(options: &[QuickOption]) -> Vec<String> {
    options.iter().map(|o| o.label().to_string()).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub state: SessionState,
    pub current_intent: Option<Intent>,
    pub last_search_term: Option<String>,
    /// Text of the request currently in flight.
    pub pending_term: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processing(&self) -> bool {
        self.state == SessionState::Processing
    }

    /// Whether `option` may be honored in the current state.
    ///
    /// Stale buttons from older prompts stay clickable; this is where they get
    /// re-validated.
    pub fn accepts(&self, option: QuickOption) -> bool {
        match self.state {
            SessionState::Processing => false,
            SessionState::ChoosingOption | SessionState::AwaitingValue => {
                option == QuickOption::GoHome || HOME_OPTIONS.contains(&option)
            }
            SessionState::FinishedSearch => POST_SEARCH_OPTIONS.contains(&option),
        }
    }

    /// Full reset triggered by "Voltar": the only path that forgets the last term.
    pub fn go_home(&mut self) {
        self.state = SessionState::ChoosingOption;
        self.current_intent = None;
        self.last_search_term = None;
        self.pending_term = None;
    }

    /// Return to the home prompt after a map, an error, or a failure.
    /// Keeps `last_search_term`.
    pub fn reset_to_choosing(&mut self) {
        self.state = SessionState::ChoosingOption;
        self.current_intent = None;
        self.pending_term = None;
    }

    pub fn choose_intent(&mut self, intent: Intent) {
        self.state = SessionState::AwaitingValue;
        self.current_intent = Some(intent);
    }

    /// Mark a request as in flight for `term`.
    pub fn begin_processing(&mut self, term: String) {
        self.state = SessionState::Processing;
        self.pending_term = Some(term);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_label() {
        for option in HOME_OPTIONS.iter().chain(POST_SEARCH_OPTIONS.iter()) {
            assert_eq!(QuickOption::from_label(option.label()), Some(*option));
        }
    }

    #[test]
    fn test_go_home_keyword_is_case_insensitive() {
        assert_eq!(QuickOption::from_label("VOLTAR"), Some(QuickOption::GoHome));
        assert_eq!(QuickOption::from_label("  voltar "), Some(QuickOption::GoHome));
    }

    #[test]
    fn test_unknown_label_is_none() {
        assert_eq!(QuickOption::from_label("Comprar remédio"), None);
    }

    #[test]
    fn test_intent_wire_names() {
        assert_eq!(Intent::LocatePharmacy.wire_name(), "onde retirar medicamento");
        assert_eq!(Intent::LookupByDiagnosisCode.wire_name(), "cid");
        assert_eq!(Intent::LookupByMedicationName.wire_name(), "medicamento");
    }

    #[test]
    fn test_intent_serializes_as_wire_name() {
        for intent in [
            Intent::LocatePharmacy,
            Intent::LookupByDiagnosisCode,
            Intent::LookupByMedicationName,
        ] {
            assert_eq!(
                serde_json::to_value(intent).unwrap(),
                serde_json::Value::String(intent.wire_name().to_string())
            );
        }
    }

    #[test]
    fn test_processing_accepts_nothing() {
        let mut session = Session::new();
        session.begin_processing("x".into());
        for option in HOME_OPTIONS.iter().chain(POST_SEARCH_OPTIONS.iter()) {
            assert!(!session.accepts(*option));
        }
    }

    #[test]
    fn test_pickup_only_after_answer() {
        let mut session = Session::new();
        assert!(!session.accepts(QuickOption::LocatePickup));
        session.state = SessionState::FinishedSearch;
        assert!(session.accepts(QuickOption::LocatePickup));
        assert!(!session.accepts(QuickOption::DiagnosisCodeInfo));
    }

    #[test]
    fn test_reset_keeps_last_term_but_go_home_clears_it() {
        let mut session = Session::new();
        session.last_search_term = Some("dipirona".into());
        session.choose_intent(Intent::LocatePharmacy);

        session.reset_to_choosing();
        assert_eq!(session.last_search_term.as_deref(), Some("dipirona"));
        assert_eq!(session.current_intent, None);

        session.go_home();
        assert_eq!(session.last_search_term, None);
        assert_eq!(session.state, SessionState::ChoosingOption);
    }
}
