#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use sitepulse_ai::{GenerationError, GenerationRequest, TextGenerator};
use sitepulse_api::auth::jwt::{generate_access_token, JwtConfig};
use sitepulse_api::config::{AiConfig, ServerConfig, StorageBackend, StoreBackend};
use sitepulse_api::router::build_app_router;
use sitepulse_api::state::AppState;
use sitepulse_cloud::LocalDiskStore;
use sitepulse_db::LocalStore;
use sitepulse_tracker::{Collaborators, GenerationSettings, PersistPolicy};

pub const JWT_SECRET: &str = "integration-test-secret";

/// Replies with a fixed acknowledgement and records every prompt.
///
/// A gated generator records the prompt, then waits for a permit before
/// replying.
#[derive(Default)]
pub struct StubGenerator {
    prompts: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl StubGenerator {
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            prompts: Mutex::default(),
            gate: Some(gate),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let count = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(request.prompt);
            prompts.len()
        };
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        Ok(format!("Noted, thanks (reply {count})."))
    }
}

/// Build a test `ServerConfig` that keeps everything under `dir`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        chat_idle_timeout: Duration::from_secs(1800),
        max_upload_bytes: 5 * 1024 * 1024,
        public_base_url: "https://app.example.com".to_string(),
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
        store: StoreBackend::Local {
            path: dir.join("store.json"),
        },
        storage: StorageBackend::Local {
            dir: dir.join("uploads"),
            public_url: "http://localhost:3000/files".to_string(),
        },
        ai: AiConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(5),
            generation: GenerationSettings::default(),
        },
        persist: PersistPolicy::with_attempts(1, Duration::from_millis(1)),
    }
}

/// A running app plus the handles tests inspect.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub generator: Arc<StubGenerator>,
    _dir: TempDir,
}

impl TestApp {
    /// A fresh router clone for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// A signed access token for `user_id`.
    pub fn token(&self, user_id: &str) -> String {
        generate_access_token(
            user_id,
            Some(&format!("{user_id}@example.com")),
            &self.state.config.jwt,
        )
        .expect("token generation should succeed")
    }
}

/// Build the full application router over a temp-dir local store, local
/// disk storage and a stub generator.
///
/// Uses the same [`build_app_router`] as `main.rs` so tests exercise the
/// production middleware stack.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(StubGenerator::default()).await
}

/// Like [`build_test_app`], with a caller-supplied generator.
pub async fn build_test_app_with(generator: StubGenerator) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let store = LocalStore::open(dir.path().join("store.json"))
        .await
        .expect("local store should open");
    let storage = LocalDiskStore::new(dir.path().join("uploads"), "http://localhost:3000/files");
    let generator = Arc::new(generator);

    let collaborators = Collaborators {
        store: Arc::new(store),
        storage: Arc::new(storage),
        generator: generator.clone(),
    };
    let state = AppState::new(config.clone(), collaborators);
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        generator,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// One part of a multipart form: `(name, file_name, content)`.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

const BOUNDARY: &str = "sitepulse-test-boundary";

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[Part<'_>],
    token: &str,
) -> Response<Body> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// The three text fields of the create-project form.
pub fn project_fields<'a>(name: &'a str) -> Vec<Part<'a>> {
    vec![
        ("project_name", None, name.as_bytes()),
        ("description", None, b"Pour footings and slab".as_slice()),
        ("tracking_focus_areas", None, b"percent complete, blockers".as_slice()),
    ]
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
