// ============================================================================
// Test Utilities for the API gateway
// ============================================================================
//
// Spawns mock upstream services (auth / paciente / consulta) that record every
// request they receive, plus a real gateway wired to them.
//
// ============================================================================

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_gateway::app::{build_router, build_state};
use api_gateway::config::{AppEnv, Config};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, get_current_timestamp};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

pub const SECRET: &str = "gateway-test-secret-0123456789abcdef";

pub const ORDERED_ERROR_BODY: &str =
    r#"{"status":400,"error":"Bad Request","message":"cpf invalido"}"#;

/// A request as seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct MockState {
    name: &'static str,
    seen: Arc<Mutex<Vec<Captured>>>,
}

pub struct MockUpstream {
    pub url: String,
    seen: Arc<Mutex<Vec<Captured>>>,
}

impl MockUpstream {
    pub fn requests(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.requests()
            .pop()
            .expect("upstream received no request")
    }

    pub fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

// Canned behaviour keyed by path:
// - /fail-json → 404 {"error":"not found"}
// - /fail-text → 500 internal failure (text/plain)
// - /fail-ordered → 400 with a multi-key JSON body written by hand (key order matters)
// - /slow      → 200 after 3 seconds
// - anything else → 200 {"service": <name>, "uri": <uri>}
async fn record(State(mock): State<MockState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    mock.seen.lock().unwrap().push(Captured {
        method: parts.method.clone(),
        uri: parts.uri.to_string(),
        headers: parts.headers.clone(),
        body,
    });

    match parts.uri.path() {
        "/fail-json" => {
            (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response()
        }
        "/fail-text" => (StatusCode::INTERNAL_SERVER_ERROR, "internal failure").into_response(),
        "/fail-ordered" => (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "application/json")],
            ORDERED_ERROR_BODY,
        )
            .into_response(),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            StatusCode::OK.into_response()
        }
        _ => Json(json!({"service": mock.name, "uri": parts.uri.to_string()})).into_response(),
    }
}

pub async fn spawn_upstream(name: &'static str) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(MockState {
        name,
        seen: seen.clone(),
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        url: format!("http://127.0.0.1:{}", port),
        seen,
    }
}

/// URL of a port nothing listens on (connection refused).
pub async fn closed_upstream_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn test_config(auth: &str, paciente: &str, consulta: &str) -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        auth_ms_url: Url::parse(auth).unwrap(),
        paciente_ms_url: Url::parse(paciente).unwrap(),
        consulta_ms_url: Url::parse(consulta).unwrap(),
        jwt_secret: Some(SECRET.to_string()),
        jwt_leeway_seconds: 0,
        upstream_timeout: Duration::from_secs(5),
        body_limit_bytes: 1024 * 1024,
    }
}

pub async fn spawn_gateway(config: Config) -> String {
    let state = build_state(&config).unwrap();
    let app = build_router(state, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Gateway wired to three recording upstreams.
pub struct TestApp {
    pub address: String,
    pub auth: MockUpstream,
    pub paciente: MockUpstream,
    pub consulta: MockUpstream,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut Config)) -> Self {
        let auth = spawn_upstream("auth").await;
        let paciente = spawn_upstream("paciente").await;
        let consulta = spawn_upstream("consulta").await;

        let mut config = test_config(&auth.url, &paciente.url, &consulta.url);
        customize(&mut config);
        let address = spawn_gateway(config).await;

        Self {
            address,
            auth,
            paciente,
            consulta,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.unwrap()
    }
}

pub fn sign(claims: &Value) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Valid token for `role` with fixed identity claims.
pub fn token_for(role: &str) -> String {
    sign(&json!({
        "sub": "u1",
        "cpf": "123",
        "email": "a@b.c",
        "type": role,
        "exp": get_current_timestamp() + 600,
    }))
}
