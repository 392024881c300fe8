use farmabot::conversation::{
    BackendResult, ConversationClient, ConversationRequest, DomainErrorCode, HttpConversationClient,
};
use farmabot::core::message::{Marker, MatchQuality};
use farmabot::core::session::Intent;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn client_for(server: &MockServer) -> HttpConversationClient {
    HttpConversationClient::new(&server.uri(), "/chat", "/health")
}

/// Mounts a `/chat` mock answering with `body` and returns the client's result.
async fn send_against(body: serde_json::Value) -> BackendResult {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    client_for(&mock_server)
        .send(&ConversationRequest::new("dipirona", Some(Intent::LookupByMedicationName)))
        .await
}

// ============================================================================
// Chat Endpoint
// ============================================================================

#[tokio::test]
async fn test_request_body_carries_text_and_intent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"text": "F32", "intent": "cid"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Depressão"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .send(&ConversationRequest::new("F32", Some(Intent::LookupByDiagnosisCode)))
        .await;

    assert!(
        matches!(result, BackendResult::Answer { ref text, .. } if text == "Depressão"),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn test_request_without_intent_sends_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"text": "oi", "intent": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Olá"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .send(&ConversationRequest::new("oi", None))
        .await;
    assert!(matches!(result, BackendResult::Answer { .. }));
}

#[tokio::test]
async fn test_exact_answer_with_latency() {
    let result = send_against(json!({
        "answer": "Dipirona está disponível na rede municipal.",
        "latency": 1.25,
        "match_type": "exato",
        "nome_encontrado": "DIPIRONA SODICA 500MG"
    }))
    .await;

    assert_eq!(
        result,
        BackendResult::Answer {
            text: "Dipirona está disponível na rede municipal.".to_string(),
            latency: Some(1.25),
            match_quality: Some(MatchQuality::Exact),
            matched_name: Some("DIPIRONA SODICA 500MG".to_string()),
        }
    );
}

#[tokio::test]
async fn test_map_data_becomes_geo_result() {
    let result = send_against(json!({
        "map_data": {
            "markers": [
                {"nome": "Farmácia Central", "endereco": "Rua do Acampamento, 100", "lat": -29.68, "lng": -53.80, "imagem": "http://img/1.png"},
                {"nome": "Farmácia Norte", "lat": -29.67, "lng": -53.79}
            ],
            "center": [-29.684, -53.806]
        }
    }))
    .await;

    assert_eq!(
        result,
        BackendResult::GeoResult {
            markers: vec![
                Marker {
                    name: "Farmácia Central".to_string(),
                    address: Some("Rua do Acampamento, 100".to_string()),
                    lat: -29.68,
                    lng: -53.80,
                    image_url: Some("http://img/1.png".to_string()),
                },
                Marker {
                    name: "Farmácia Norte".to_string(),
                    address: None,
                    lat: -29.67,
                    lng: -53.79,
                    image_url: None,
                },
            ],
            center: Some((-29.684, -53.806)),
        }
    );
}

#[tokio::test]
async fn test_empty_marker_list_keeps_center() {
    let result = send_against(json!({"map_data": {"markers": [], "center": [-29.6, -53.8]}})).await;
    assert_eq!(
        result,
        BackendResult::GeoResult {
            markers: vec![],
            center: Some((-29.6, -53.8)),
        }
    );
}

#[tokio::test]
async fn test_error_code_is_domain_error() {
    let result = send_against(json!({"erro": "CID inválido"})).await;
    assert_eq!(result, BackendResult::DomainError(DomainErrorCode::InvalidCid));
}

#[tokio::test]
async fn test_legacy_invalido_field_is_domain_error() {
    let result = send_against(json!({"invalido": "Nenhum local encontrado com coordenadas"})).await;
    assert_eq!(
        result,
        BackendResult::DomainError(DomainErrorCode::NoPickupLocation)
    );
}

// ============================================================================
// Transport Failures
// ============================================================================

#[tokio::test]
async fn test_server_error_is_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .send(&ConversationRequest::new("B20", Some(Intent::LookupByDiagnosisCode)))
        .await;
    assert_eq!(result, BackendResult::TransportFailure);
}

#[tokio::test]
async fn test_malformed_body_is_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .send(&ConversationRequest::new("B20", None))
        .await;
    assert_eq!(result, BackendResult::TransportFailure);
}

#[tokio::test]
async fn test_body_without_known_fields_is_transport_failure() {
    assert_eq!(send_against(json!({})).await, BackendResult::TransportFailure);
    assert_eq!(
        send_against(json!({"answer": ""})).await,
        BackendResult::TransportFailure
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_failure() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let client = HttpConversationClient::new(&uri, "/chat", "/health");
    let result = client.send(&ConversationRequest::new("x", None)).await;
    assert_eq!(result, BackendResult::TransportFailure);
    assert!(!client.health().await);
}

// ============================================================================
// Health Endpoint
// ============================================================================

#[tokio::test]
async fn test_health_reports_online() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).health().await);
}

#[tokio::test]
async fn test_health_reports_offline_on_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    assert!(!client_for(&mock_server).health().await);
}
