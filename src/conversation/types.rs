use serde::{Deserialize, Serialize};

use crate::core::message::{MatchQuality, Marker};
use crate::core::session::Intent;

/// Body of `POST /chat`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConversationRequest {
    pub text: String,
    pub intent: Option<Intent>,
}

impl ConversationRequest {
    pub fn new(text: impl Into<String>, intent: Option<Intent>) -> Self {
        Self {
            text: text.into(),
            intent,
        }
    }
}

/// Problem codes the backend reports explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainErrorCode {
    InvalidCid,
    CidNotFound,
    MedicationNotFound,
    NoPickupLocation,
    /// Anything unrecognized, kept verbatim for the fallback message.
    Other(String),
}

impl DomainErrorCode {
    pub fn parse(code: &str) -> Self {
        let trimmed = code.trim();
        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "cid inválido" | "cid invalido" => DomainErrorCode::InvalidCid,
            "cid nao encontrado" | "cid não encontrado" => DomainErrorCode::CidNotFound,
            "nenhum local encontrado com coordenadas" => DomainErrorCode::NoPickupLocation,
            _ if lower.contains("não consegui encontrar informações sobre esse medicamento") => {
                DomainErrorCode::MedicationNotFound
            }
            _ => DomainErrorCode::Other(trimmed.to_string()),
        }
    }

    /// User-facing explanation for the code.
    pub fn explanation(&self) -> String {
        match self {
            DomainErrorCode::InvalidCid => "Não entendi qual CID você procura. Informe um CID com no mínimo 3 e no máximo 5 caracteres.".to_string(),
            DomainErrorCode::CidNotFound => {
                "Não encontrei informações para esse CID. Confira o código e tente novamente."
                    .to_string()
            }
            DomainErrorCode::MedicationNotFound => {
                "Desculpe, não consegui encontrar informações sobre esse medicamento.".to_string()
            }
            DomainErrorCode::NoPickupLocation => {
                "Não encontrei farmácias com endereço cadastrado para esse medicamento.".to_string()
            }
            DomainErrorCode::Other(code) => format!("Ops! Ocorreu um problema: {code}"),
        }
    }
}

/// Classified outcome of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResult {
    Answer {
        text: String,
        latency: Option<f64>,
        match_quality: Option<MatchQuality>,
        matched_name: Option<String>,
    },
    GeoResult {
        markers: Vec<Marker>,
        center: Option<(f64, f64)>,
    },
    DomainError(DomainErrorCode),
    TransportFailure,
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Deserialize, Debug, Default)]
pub(crate) struct RawResponse {
    answer: Option<String>,
    latency: Option<f64>,
    match_type: Option<String>,
    nome_encontrado: Option<String>,
    map_data: Option<RawMapData>,
    /// `invalido` is the legacy name of the same field.
    #[serde(alias = "invalido")]
    erro: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawMapData {
    #[serde(default)]
    markers: Vec<RawMarker>,
    center: Option<[f64; 2]>,
}

#[derive(Deserialize, Debug)]
struct RawMarker {
    nome: String,
    endereco: Option<String>,
    lat: f64,
    lng: f64,
    imagem: Option<String>,
}

impl From<RawMarker> for Marker {
    fn from(raw: RawMarker) -> Self {
        Marker {
            name: raw.nome,
            address: raw.endereco.filter(|a| !a.trim().is_empty()),
            lat: raw.lat,
            lng: raw.lng,
            image_url: raw.imagem.filter(|i| !i.trim().is_empty()),
        }
    }
}

fn parse_match_quality(value: Option<&str>) -> Option<MatchQuality> {
    match value? {
        "exato" => Some(MatchQuality::Exact),
        "semelhante" => Some(MatchQuality::Fuzzy),
        other => {
            log::debug!("Ignoring unknown match_type '{}'", other);
            None
        }
    }
}

/// Why a success body could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unclassifiable {
    Empty,
    Ambiguous,
}

impl RawResponse {
    /// Resolves the body to exactly one result variant.
    pub(crate) fn classify(self) -> Result<BackendResult, Unclassifiable> {
        let error = self.erro.filter(|e| !e.trim().is_empty());
        let answer = self.answer.filter(|a| !a.trim().is_empty());

        let populated = [error.is_some(), self.map_data.is_some(), answer.is_some()]
            .into_iter()
            .filter(|present| *present)
            .count();

        match populated {
            0 => return Err(Unclassifiable::Empty),
            1 => {}
            _ => return Err(Unclassifiable::Ambiguous),
        }

        if let Some(code) = error {
            return Ok(BackendResult::DomainError(DomainErrorCode::parse(&code)));
        }

        if let Some(map) = self.map_data {
            return Ok(BackendResult::GeoResult {
                markers: map.markers.into_iter().map(Marker::from).collect(),
                center: map.center.map(|[lat, lng]| (lat, lng)),
            });
        }

        match answer {
            Some(text) => Ok(BackendResult::Answer {
                text,
                latency: self.latency.filter(|l| l.is_finite() && *l >= 0.0),
                match_quality: parse_match_quality(self.match_type.as_deref()),
                matched_name: self.nome_encontrado,
            }),
            None => Err(Unclassifiable::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(json: &str) -> Result<BackendResult, Unclassifiable> {
        serde_json::from_str::<RawResponse>(json).unwrap().classify()
    }

    #[test]
    fn test_request_serializes_intent_wire_name() {
        let req = ConversationRequest::new("B20", Some(Intent::LookupByDiagnosisCode));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"text": "B20", "intent": "cid"})
        );
    }

    #[test]
    fn test_request_without_intent_sends_null() {
        let req = ConversationRequest::new("oi", None);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"text": "oi", "intent": null})
        );
    }

    #[test]
    fn test_answer_with_annotations() {
        let result = classify(
            r#"{"answer":"Encontrei","latency":0.42,"match_type":"semelhante","nome_encontrado":"DIPIRONA"}"#,
        );
        assert_eq!(
            result,
            Ok(BackendResult::Answer {
                text: "Encontrei".into(),
                latency: Some(0.42),
                match_quality: Some(MatchQuality::Fuzzy),
                matched_name: Some("DIPIRONA".into()),
            })
        );
    }

    #[test]
    fn test_unknown_match_type_is_dropped() {
        match classify(r#"{"answer":"x","match_type":"talvez"}"#) {
            Ok(BackendResult::Answer { match_quality, .. }) => assert_eq!(match_quality, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_map_data_markers_and_center() {
        let result = classify(
            r#"{"map_data":{"markers":[{"nome":"Farmácia A","lat":1,"lng":2,"endereco":"Rua 1","imagem":""}],"center":[1,2]}}"#,
        );
        assert_eq!(
            result,
            Ok(BackendResult::GeoResult {
                markers: vec![Marker {
                    name: "Farmácia A".into(),
                    address: Some("Rua 1".into()),
                    lat: 1.0,
                    lng: 2.0,
                    image_url: None,
                }],
                center: Some((1.0, 2.0)),
            })
        );
    }

    #[test]
    fn test_error_field_and_legacy_alias() {
        assert_eq!(
            classify(r#"{"erro":"CID inválido"}"#),
            Ok(BackendResult::DomainError(DomainErrorCode::InvalidCid))
        );
        assert_eq!(
            classify(r#"{"invalido":"cid nao encontrado"}"#),
            Ok(BackendResult::DomainError(DomainErrorCode::CidNotFound))
        );
    }

    #[test]
    fn test_empty_and_ambiguous_bodies() {
        assert_eq!(classify("{}"), Err(Unclassifiable::Empty));
        assert_eq!(classify(r#"{"answer":"   "}"#), Err(Unclassifiable::Empty));
        assert_eq!(
            classify(r#"{"answer":"x","erro":"y"}"#),
            Err(Unclassifiable::Ambiguous)
        );
    }

    #[test]
    fn test_unrecognized_code_falls_back_to_generic_message() {
        let code = DomainErrorCode::parse("Tamanho cid inválido");
        assert_eq!(code, DomainErrorCode::Other("Tamanho cid inválido".into()));
        assert_eq!(
            code.explanation(),
            "Ops! Ocorreu um problema: Tamanho cid inválido"
        );
    }

    #[test]
    fn test_medication_not_found_sentence_is_recognized() {
        let code = DomainErrorCode::parse(
            "Desculpe, não consegui encontrar informações sobre esse medicamento.",
        );
        assert_eq!(code, DomainErrorCode::MedicationNotFound);
    }
}
