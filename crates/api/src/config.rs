use std::path::PathBuf;
use std::time::Duration;

use sitepulse_tracker::{GenerationSettings, PersistPolicy};

use crate::auth::jwt::JwtConfig;

const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "90";
const DEFAULT_AI_TIMEOUT_SECS: &str = "60";

/// Which [`RecordStore`](sitepulse_db::RecordStore) backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    /// Offline mode: a single JSON document on local disk.
    Local { path: PathBuf },
}

/// Where uploaded schedule files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Files under `dir`, served by this process at `/files`.
    Local { dir: PathBuf, public_url: String },
    S3 { bucket: String, public_url: String },
}

/// Text-generation provider settings.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub generation: GenerationSettings,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Covers a full chat turn, so it must
    /// exceed the generation timeout.
    pub request_timeout_secs: u64,
    /// Chat sessions unused for this long are dropped.
    pub chat_idle_timeout: Duration,
    /// Request body cap, sized for schedule uploads.
    pub max_upload_bytes: usize,
    /// Front-end origin that contractor links point at.
    pub public_base_url: String,
    pub jwt: JwtConfig,
    pub store: StoreBackend,
    pub storage: StorageBackend,
    pub ai: AiConfig,
    pub persist: PersistPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                          |
    /// |--------------------------|----------------------------------|
    /// | `HOST`                   | `0.0.0.0`                        |
    /// | `PORT`                   | `3000`                           |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS`   | `90`                             |
    /// | `CHAT_IDLE_TIMEOUT_SECS` | `1800`                           |
    /// | `MAX_UPLOAD_BYTES`       | `52428800`                       |
    /// | `PUBLIC_BASE_URL`        | `http://localhost:5173`          |
    /// | `JWT_SECRET`             | required                         |
    /// | `STORE_BACKEND`          | `postgres` (or `local`)          |
    /// | `DATABASE_URL`           | required for `postgres`          |
    /// | `LOCAL_STORE_PATH`       | `./data/store.json`              |
    /// | `STORAGE_BACKEND`        | `local` (or `s3`)                |
    /// | `STORAGE_DIR`            | `./data/uploads`                 |
    /// | `STORAGE_PUBLIC_URL`     | `http://localhost:3000/files`    |
    /// | `S3_BUCKET`              | required for `s3`                |
    /// | `S3_PUBLIC_URL`          | required for `s3`                |
    /// | `AI_API_URL`             | `https://api.openai.com/v1`      |
    /// | `AI_API_KEY`             | required                         |
    /// | `AI_MODEL`               | `gpt-4o-mini`                    |
    /// | `AI_MAX_TOKENS`          | `500`                            |
    /// | `AI_ANALYSIS_MAX_TOKENS` | `1200`                           |
    /// | `AI_TIMEOUT_SECS`        | `60`                             |
    /// | `PERSIST_ATTEMPTS`       | `1`                              |
    /// | `PERSIST_BACKOFF_MS`     | `250`                            |
    ///
    /// # Panics
    ///
    /// Panics on missing required values, unparseable numbers, or a request
    /// timeout that does not exceed the generation timeout.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = parse_env("PORT", "3000");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 =
            parse_env("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);
        let chat_idle_timeout =
            Duration::from_secs(parse_env("CHAT_IDLE_TIMEOUT_SECS", "1800"));
        let max_upload_bytes: usize = parse_env("MAX_UPLOAD_BYTES", "52428800");
        let public_base_url = env_or("PUBLIC_BASE_URL", "http://localhost:5173");

        let store = match env_or("STORE_BACKEND", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: required("DATABASE_URL"),
            },
            "local" => StoreBackend::Local {
                path: env_or("LOCAL_STORE_PATH", "./data/store.json").into(),
            },
            other => panic!("STORE_BACKEND must be 'postgres' or 'local', got '{other}'"),
        };

        let storage = match env_or("STORAGE_BACKEND", "local").as_str() {
            "local" => StorageBackend::Local {
                dir: env_or("STORAGE_DIR", "./data/uploads").into(),
                public_url: env_or("STORAGE_PUBLIC_URL", "http://localhost:3000/files"),
            },
            "s3" => StorageBackend::S3 {
                bucket: required("S3_BUCKET"),
                public_url: required("S3_PUBLIC_URL"),
            },
            other => panic!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        let ai = AiConfig {
            api_url: env_or("AI_API_URL", "https://api.openai.com/v1"),
            api_key: required("AI_API_KEY"),
            timeout: Duration::from_secs(parse_env(
                "AI_TIMEOUT_SECS",
                DEFAULT_AI_TIMEOUT_SECS,
            )),
            generation: GenerationSettings {
                model: env_or("AI_MODEL", "gpt-4o-mini"),
                chat_max_tokens: Some(parse_env("AI_MAX_TOKENS", "500")),
                analysis_max_tokens: Some(parse_env("AI_ANALYSIS_MAX_TOKENS", "1200")),
            },
        };

        let persist = PersistPolicy::with_attempts(
            parse_env("PERSIST_ATTEMPTS", "1"),
            Duration::from_millis(parse_env("PERSIST_BACKOFF_MS", "250")),
        );

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            chat_idle_timeout,
            max_upload_bytes,
            public_base_url,
            jwt: JwtConfig::from_env(),
            store,
            storage,
            ai,
            persist,
        };
        config.validate();
        config
    }

    /// Check cross-field constraints.
    ///
    /// # Panics
    ///
    /// Panics if the request timeout does not exceed the generation timeout.
    pub fn validate(&self) {
        let ai_secs = self.ai.timeout.as_secs_f64();
        assert!(
            (self.request_timeout_secs as f64) > ai_secs,
            "REQUEST_TIMEOUT_SECS ({}) must exceed AI_TIMEOUT_SECS ({ai_secs})",
            self.request_timeout_secs,
        );
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn required(key: &str) -> String {
    let value = std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set"));
    assert!(!value.trim().is_empty(), "{key} must not be empty");
    value
}

fn parse_env<T>(key: &str, default: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .unwrap_or_else(|e| panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(request_timeout_secs: u64, ai_timeout_secs: u64) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs,
            chat_idle_timeout: Duration::from_secs(1800),
            max_upload_bytes: 1024,
            public_base_url: "http://localhost:5173".to_string(),
            jwt: JwtConfig {
                secret: "secret".to_string(),
                access_token_expiry_mins: 60,
            },
            store: StoreBackend::Local {
                path: "store.json".into(),
            },
            storage: StorageBackend::Local {
                dir: "uploads".into(),
                public_url: "http://localhost:3000/files".to_string(),
            },
            ai: AiConfig {
                api_url: "http://localhost".to_string(),
                api_key: "key".to_string(),
                timeout: Duration::from_secs(ai_timeout_secs),
                generation: GenerationSettings::default(),
            },
            persist: PersistPolicy::default(),
        }
    }

    #[test]
    fn default_request_timeout_exceeds_generation_timeout() {
        let request: u64 = DEFAULT_REQUEST_TIMEOUT_SECS.parse().unwrap();
        let ai: u64 = DEFAULT_AI_TIMEOUT_SECS.parse().unwrap();
        config(request, ai).validate();
    }

    #[test]
    #[should_panic(expected = "must exceed AI_TIMEOUT_SECS")]
    fn equal_timeouts_are_rejected() {
        config(60, 60).validate();
    }
}
