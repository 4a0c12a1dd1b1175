//! Integration tests for the REST services against a mock API server.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sentinel_client::{
    ApiClient, ApiError, AuthService, CameraControlService, ClipService, ConnectionService,
    EventService, MessageService,
};
use sentinel_core::auth::LoginResponse;
use sentinel_core::control::CameraAction;
use sentinel_core::error::CoreError;
use sentinel_core::event::EventQuery;
use sentinel_core::session::{MemoryTokenStore, Session, TokenStore};

fn connection_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "id_oficina": 1,
        "nombre_camara": "Av. Abancay",
        "ubicacion": "Centro",
        "rtsp_url": "rtsp://10.0.0.2/live",
        "estado": "activa",
        "ultimo_ping": null,
        "modo_ingesta": "SEGMENT",
        "fps_sample": 5,
        "habilitada": true,
        "retention_minutes": 30,
        "created_at": "2025-03-01T10:00:00",
        "updated_at": null
    })
}

fn signed_in_store(expires_in: Option<u64>, issued_secs_ago: i64) -> Arc<MemoryTokenStore> {
    let grant = LoginResponse {
        access_token: "tok-123".into(),
        token_type: "bearer".into(),
        expires_in,
    };
    let issued = chrono::Utc::now() - chrono::Duration::seconds(issued_secs_ago);
    Arc::new(MemoryTokenStore::with_session(Session::from_login(&grant, issued)))
}

fn api(server: &MockServer, store: Arc<dyn TokenStore>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&server.uri(), store, Duration::from_secs(5)).unwrap())
}

// ---------------------------------------------------------------------------
// Test: authenticated requests carry the bearer token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_connections_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conexiones"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([connection_json(7)])))
        .expect(1)
        .mount(&server)
        .await;

    let service = ConnectionService::new(api(&server, signed_in_store(Some(3600), 0)));
    let conns = service.list().await.unwrap();

    assert_eq!(conns.len(), 1);
    assert_eq!(conns[0].id, 7);
}

// ---------------------------------------------------------------------------
// Test: an expired session is not sent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_session_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conexiones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = signed_in_store(Some(60), 120);
    let service = ConnectionService::new(api(&server, store.clone()));
    service.list().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert!(store.read().unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: error bodies surface the `detail` message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_error_uses_detail_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@x.pe", "password": "bad"})))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Credenciales inválidas"})),
        )
        .mount(&server)
        .await;

    let auth = AuthService::new(api(&server, Arc::new(MemoryTokenStore::new())));
    let err = auth.login("a@x.pe", "bad").await.unwrap_err();

    assert_matches!(err, ApiError::Api { status: 401, ref message } if message == "Credenciales inválidas");
}

#[tokio::test]
async fn non_json_error_body_is_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/oficinas"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let offices =
        sentinel_client::OfficeService::new(api(&server, signed_in_store(None, 0)));
    let err = offices.list().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Unknown error");
}

// ---------------------------------------------------------------------------
// Test: login without an access token is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_without_token_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": ""})))
        .mount(&server)
        .await;

    let auth = AuthService::new(api(&server, Arc::new(MemoryTokenStore::new())));
    assert_matches!(
        auth.login("a@x.pe", "pw").await,
        Err(ApiError::EmptyResponse(_))
    );
}

// ---------------------------------------------------------------------------
// Test: user lookup by email returns the first match
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_by_email_returns_first_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .and(query_param("email", "ops@sentinel.pe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"nombre": "Ana", "apellido": "Ruiz", "email": "ops@sentinel.pe", "rol": "ADMIN", "phone": "+51"},
            {"nombre": "Luis", "apellido": "Paz", "email": "ops@sentinel.pe", "rol": "WORKER", "phone": "+51"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .and(query_param("email", "nobody@sentinel.pe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let auth = AuthService::new(api(&server, Arc::new(MemoryTokenStore::new())));

    let user = auth.user_by_email("ops@sentinel.pe").await.unwrap().unwrap();
    assert_eq!(user.rol, "ADMIN");
    assert!(auth.user_by_email("nobody@sentinel.pe").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: 204 responses are accepted where no body is needed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_user_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/auth/users/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthService::new(api(&server, signed_in_store(None, 0)));
    auth.delete_user(12).await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: reset token validation maps any failure to false
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_token_validation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/reset-password/validate"))
        .and(query_param("token", "good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/reset-password/validate"))
        .and(query_param("token", "stale"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;

    let auth = AuthService::new(api(&server, Arc::new(MemoryTokenStore::new())));

    assert!(auth.validate_reset_token("good").await);
    assert!(!auth.validate_reset_token("stale").await);
    assert!(!auth.validate_reset_token("").await);
}

// ---------------------------------------------------------------------------
// Test: state / enabled toggles go through query parameters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_state_uses_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/conexiones/5/estado"))
        .and(query_param("activo", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_json(5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/conexiones/5/habilitada"))
        .and(query_param("habilitada", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_json(5)))
        .expect(1)
        .mount(&server)
        .await;

    let service = ConnectionService::new(api(&server, signed_in_store(None, 0)));
    assert_eq!(service.update_state(5, false).await.unwrap().id, 5);
    assert_eq!(service.update_enabled(5, true).await.unwrap().id, 5);
}

// ---------------------------------------------------------------------------
// Test: looking up a connection the list does not contain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_unknown_connection_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conexiones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([connection_json(1), connection_json(2)])))
        .mount(&server)
        .await;

    let service = ConnectionService::new(api(&server, signed_in_store(None, 0)));
    assert_eq!(service.get(2).await.unwrap().id, 2);

    let err = service.get(9).await.unwrap_err();
    assert_matches!(
        err,
        ApiError::Core(CoreError::NotFound { entity: "connection", id: 9 })
    );
    assert_eq!(err.status(), None);
    assert_eq!(err.to_string(), "Entity not found: connection with id 9");
}

// ---------------------------------------------------------------------------
// Test: filtered event listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn events_for_connection_send_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/eventos"))
        .and(query_param("limit", "200"))
        .and(query_param("offset", "0"))
        .and(query_param("id_conexion", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id_evento": 1,
            "id_conexion": 3,
            "id_clip": 9,
            "id_usuario": null,
            "tipo_evento": "golpe",
            "confianza": "0.91",
            "t_inicio_ms": 1000,
            "t_fin_ms": 2400,
            "timestamp_evento": "2025-03-02T08:00:00",
            "procesado": true,
            "subclip_path": "C:\\srv\\data\\events\\e1.mp4",
            "subclip_duracion_sec": 1.4
        }])))
        .mount(&server)
        .await;

    let service = EventService::new(api(&server, signed_in_store(None, 0)));
    let events = service
        .list_filtered(&EventQuery::for_connection(3))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].confianza.value(), Some(0.91));
}

// ---------------------------------------------------------------------------
// Test: event logs are fetched from the normalized static path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_log_uses_static_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/events/cam1/e1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "camera_id": "cam1",
            "event_start_time": "2025-03-02T08:00:00",
            "event_end_time": "2025-03-02T08:00:02",
            "video_file": "e1.mp4",
            "log_file": "e1.json",
            "video_path": "/data/events/cam1/e1.mp4",
            "log_path": "/data/events/cam1/e1.json",
            "total_logs": 1,
            "logs": [{"timestamp_ms": 0, "probabilities": {"golpe": 0.8, "normal": 0.2}}]
        })))
        .mount(&server)
        .await;

    let clips = ClipService::new(api(&server, signed_in_store(None, 0)));
    let log = clips
        .event_log(r"D:\sentinel\public\data\events\cam1\e1.json")
        .await
        .unwrap();

    assert_eq!(log.total_logs, 1);
    assert_eq!(log.logs[0].top_class(), Some(("golpe", 0.8)));
}

// ---------------------------------------------------------------------------
// Test: SMS alert without a topic id counts as not sent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sms_alert_requires_topic_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages/sns/alert"))
        .and(body_json(json!({"message": "Pelea", "phone_number": "+51999"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sms_message_id": "s1"})))
        .mount(&server)
        .await;

    let messages = MessageService::new(api(&server, Arc::new(MemoryTokenStore::new())));
    assert_matches!(
        messages.send_sms_alert("Pelea", "+51999").await,
        Err(ApiError::EmptyResponse(_))
    );
}

// ---------------------------------------------------------------------------
// Test: camera control posts the action in snake_case
// ---------------------------------------------------------------------------

#[tokio::test]
async fn camera_control_posts_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/control/camera"))
        .and(body_json(json!({"camera_id": "4", "action": "disable_inference"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "camera_id": "4",
            "action_processed": "disable_inference"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let control = CameraControlService::new(api(&server, Arc::new(MemoryTokenStore::new())));
    let resp = control.disable_inference("4").await.unwrap();

    assert_eq!(resp.action_processed, CameraAction::DisableInference.as_str());
}
