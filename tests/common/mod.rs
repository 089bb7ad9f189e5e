#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use folio_api::config::AppConfig;
use folio_api::database::MemoryProjectStore;
use folio_api::services::{ChatProxy, DeveloperProfile};
use folio_api::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@folio.test";
pub const ADMIN_PASSWORD: &str = "correct-horse";
pub const UPSTREAM_REPLY: &str = "I mostly build web applications in Rust.";

const BOUNDARY: &str = "folio-test-boundary";

/// Where the chat proxy under test sends its requests
pub enum ChatUpstream {
    /// Local axum app answering like the generative-language API
    Fake,
    /// Nothing listens there
    Unreachable,
}

/// Router over a memory store and a throwaway upload directory
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::with_upstream(ChatUpstream::Fake).await
    }

    pub async fn with_upstream(upstream: ChatUpstream) -> Result<Self> {
        let uploads = tempfile::tempdir()?;

        let mut config = AppConfig::development();
        config.admin.email = ADMIN_EMAIL.to_string();
        config.admin.password = ADMIN_PASSWORD.to_string();
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.security.cors_origins = vec![];
        config.upload.dir = uploads.path().to_path_buf();
        config.api.enable_request_logging = false;
        config.chat.api_key = Some("test-key".to_string());
        config.chat.timeout_secs = 5;
        config.chat.base_url = match upstream {
            ChatUpstream::Fake => format!("http://{}/v1beta", spawn_fake_upstream().await?),
            ChatUpstream::Unreachable => "http://127.0.0.1:9/v1beta".to_string(),
        };

        let chat = ChatProxy::new(&config.chat, DeveloperProfile::default())?;
        let state = AppState::new(config, Arc::new(MemoryProjectStore::new()), chat);
        let router = folio_api::app(state.clone());

        Ok(Self { router, state, uploads })
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.send(json_request(Method::POST, uri, body, None)).await
    }

    /// Log in as the configured admin and return the `token=...` cookie pair
    pub async fn login_cookie(&self) -> Result<String> {
        let response = self
            .post_json(
                "/api/auth/login",
                json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;
        anyhow::ensure!(response.status() == StatusCode::OK, "login failed: {}", response.status());

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .context("login response has no Set-Cookie")?
            .to_str()?;
        let pair = set_cookie.split(';').next().context("empty Set-Cookie")?;
        Ok(pair.trim().to_string())
    }
}

pub fn json_request(method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `multipart/form-data` request with one file part named `field`
pub fn multipart_request(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// Answers every POST with a single-candidate reply and every GET with 200.
async fn spawn_fake_upstream() -> Result<SocketAddr> {
    async fn respond(method: Method) -> impl IntoResponse {
        if method == Method::POST {
            Json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": UPSTREAM_REPLY }] }
                }]
            }))
            .into_response()
        } else {
            Json(json!({ "name": "models/test" })).into_response()
        }
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let upstream = Router::new().fallback(respond);
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });
    Ok(addr)
}
