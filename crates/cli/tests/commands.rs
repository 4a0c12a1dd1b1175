//! End-to-end command runs against a mock API server.

use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sentinel_cli::cli::Cli;
use sentinel_cli::commands;
use sentinel_cli::config::ClientConfig;
use sentinel_cli::context::AppContext;
use sentinel_core::auth::LoginResponse;
use sentinel_core::session::{MemoryTokenStore, Session, TokenStore};

fn context(server: &MockServer, tokens: Arc<dyn TokenStore>) -> AppContext {
    let api_url = server.uri();
    let config = ClientConfig::from_lookup(|key| match key {
        "SENTINEL_API_URL" | "SENTINEL_STREAM_URL" => Some(api_url.clone()),
        _ => None,
    })
    .unwrap();
    AppContext::with_tokens(config, tokens).unwrap()
}

fn signed_in(role: &str) -> Arc<MemoryTokenStore> {
    let grant = LoginResponse {
        access_token: "tok".into(),
        token_type: "bearer".into(),
        expires_in: Some(3600),
    };
    let session = Session::from_login(&grant, chrono::Utc::now()).with_identity("a@x.pe", Some(role.into()));
    Arc::new(MemoryTokenStore::with_session(session))
}

async fn run(ctx: &AppContext, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["sentinel"];
    argv.extend_from_slice(args);
    commands::run(ctx, Cli::try_parse_from(argv).unwrap()).await
}

// ---------------------------------------------------------------------------
// Test: login stores the token together with the looked-up role
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_session_with_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "token_type": "bearer",
            "expires_in": 600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .and(query_param("email", "jefe@x.pe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "nombre": "Luz", "apellido": "Paz", "email": "jefe@x.pe", "rol": "ADMIN"
        }])))
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let ctx = context(&server, tokens.clone());

    run(&ctx, &["login", "--email", "jefe@x.pe", "--password", "pw"]).await.unwrap();

    let session = tokens.load().unwrap().unwrap();
    assert_eq!(session.access_token, "fresh");
    assert_eq!(session.email.as_deref(), Some("jefe@x.pe"));
    assert!(session.is_admin());
    assert!(session.expires_at.is_some());
}

// ---------------------------------------------------------------------------
// Test: login is refused while a session exists
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_refused_when_already_signed_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, signed_in("WORKER"));
    let err = run(&ctx, &["login", "--email", "a@x.pe", "--password", "pw"]).await.unwrap_err();
    assert!(err.to_string().contains("sentinel logout"));
}

// ---------------------------------------------------------------------------
// Test: admin commands never reach the API for workers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn users_list_requires_admin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, signed_in("WORKER"));
    let err = run(&ctx, &["users", "list"]).await.unwrap_err();
    assert!(err.to_string().contains("ADMIN"));
}

#[tokio::test]
async fn private_commands_require_login() {
    let server = MockServer::start().await;
    let ctx = context(&server, Arc::new(MemoryTokenStore::new()));

    let err = run(&ctx, &["cameras", "list"]).await.unwrap_err();
    assert!(err.to_string().contains("sentinel login"));
}

// ---------------------------------------------------------------------------
// Test: report writes the CSV export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_writes_csv_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/eventos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id_evento": 1, "id_conexion": 2, "tipo_evento": "Golpe", "confianza": 0.9,
             "timestamp_evento": "2025-03-01T10:00:00"},
            {"id_evento": 2, "id_conexion": 2, "tipo_evento": "patada", "confianza": "0.5",
             "timestamp_evento": "2025-03-01T12:00:00"},
            {"id_evento": 3, "id_conexion": 2, "tipo_evento": "golpe", "confianza": null,
             "timestamp_evento": "2025-03-03T08:00:00"}
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv_dir = dir.path().join("exports");
    let ctx = context(&server, signed_in("WORKER"));

    run(
        &ctx,
        &["report", "--from", "2025-03-01", "--csv", csv_dir.to_str().unwrap()],
    )
    .await
    .unwrap();

    let written = std::fs::read_to_string(csv_dir.join("reporte_eventos_2025-03-01_2025-03-03.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "fecha,total_eventos,promedio_confianza,detalle_por_tipo");
    assert_eq!(lines[1], "2025-03-01,2,0.700,\"golpe:1;patada:1\"");
    assert_eq!(lines[2], "2025-03-03,1,0.000,\"golpe:1\"");
}

// ---------------------------------------------------------------------------
// Test: clip details with inference logs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clip_show_with_logs_fetches_each_event_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clips/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_clip": 4, "id_conexion": 2, "storage_path": "/data/clips/4.mp4",
            "start_time_utc": "2025-03-01T10:00:00", "duration_sec": 12.5,
            "fecha_guardado": "2025-03-01T10:00:13"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/eventos"))
        .and(query_param("id_conexion", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id_evento": 1, "id_conexion": 2, "id_clip": 4, "tipo_evento": "golpe",
             "confianza": "0.8", "timestamp_evento": "2025-03-01T10:00:05",
             "subclip_path": "/data/events/e1.json"},
            {"id_evento": 2, "id_conexion": 2, "id_clip": 4, "tipo_evento": "patada",
             "timestamp_evento": "2025-03-01T10:00:09", "subclip_path": "/data/events/e2.json"},
            {"id_evento": 3, "id_conexion": 2, "id_clip": 9, "tipo_evento": "golpe",
             "timestamp_evento": "2025-03-01T11:00:00", "subclip_path": "/data/events/e3.json"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/events/e1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "camera_id": "2", "event_start_time": "10:00:04", "event_end_time": "10:00:07",
            "video_file": "e1.mp4", "log_file": "e1.json", "video_path": "/data/e1.mp4",
            "log_path": "/data/e1.json", "total_logs": 0, "logs": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/events/e2.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/events/e3.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, signed_in("WORKER"));
    // A log that cannot be read is reported inside the document, not as a failure.
    run(&ctx, &["--json", "clips", "show", "4", "--log"]).await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: logout clears the stored session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_clears_session() {
    let server = MockServer::start().await;
    let tokens = signed_in("WORKER");
    let ctx = context(&server, tokens.clone());

    run(&ctx, &["logout"]).await.unwrap();
    assert!(tokens.load().unwrap().is_none());
}
