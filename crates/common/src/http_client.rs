//! Minimal bearer-token GET client for the remote content API.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::retry::{retry_with_policy, RetryPolicy, Retryable};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch from external API: {url}: {message}")]
    Transport { url: String, message: String, transient: bool },
    #[error("external API returned status {status}: {url}")]
    Status { url: String, status: u16 },
    #[error("invalid JSON from external API: {url}: {message}")]
    Parse { url: String, message: String },
    #[error("invalid response format from API: expected JSON object: {url}")]
    NotAnObject { url: String },
    #[error("cannot build HTTP client: {0}")]
    Client(String),
}

impl Retryable for FetchError {
    fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { transient, .. } => *transient,
            FetchError::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
            retry,
        })
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// GET `endpoint` relative to the base URL and return the top-level JSON object.
    #[instrument(skip(self))]
    pub async fn get(&self, endpoint: &str) -> Result<Map<String, Value>, FetchError> {
        let url = self.url_for(endpoint);
        retry_with_policy(&self.retry, || self.get_once(&url)).await
    }

    async fn get_once(&self, url: &str) -> Result<Map<String, Value>, FetchError> {
        let resp = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let body = resp.text().await.map_err(|e| transport_error(url, e))?;
        debug!(%url, bytes = body.len(), "external API response received");
        parse_object(url, &body)
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        transient: e.is_timeout() || e.is_connect(),
        message: e.to_string(),
    }
}

/// Parse `body` and require a JSON object at the top level.
pub fn parse_object(url: &str, body: &str) -> Result<Map<String, Value>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse { url: url.to_string(), message: e.to_string() })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(FetchError::NotAnObject { url: url.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(base, "secret", Duration::from_secs(5), RetryPolicy::disabled()).expect("client")
    }

    #[test]
    fn joins_base_and_endpoint_without_double_slashes() {
        let c = client("https://api.example.com/v1/");
        assert_eq!(c.url_for("/services"), "https://api.example.com/v1/services");
        assert_eq!(c.url_for("about-us"), "https://api.example.com/v1/about-us");
    }

    #[test]
    fn parse_object_accepts_objects() {
        let map = parse_object("u", r#"{"data":[{"id":1}]}"#).unwrap();
        assert!(map.get("data").map(Value::is_array).unwrap_or(false));
    }

    #[test]
    fn parse_object_rejects_arrays_and_scalars() {
        assert!(matches!(parse_object("u", "[1,2]"), Err(FetchError::NotAnObject { .. })));
        assert!(matches!(parse_object("u", "\"text\""), Err(FetchError::NotAnObject { .. })));
        assert!(matches!(parse_object("u", "42"), Err(FetchError::NotAnObject { .. })));
    }

    #[test]
    fn parse_object_rejects_garbage() {
        assert!(matches!(parse_object("u", "<html>"), Err(FetchError::Parse { .. })));
    }

    #[test]
    fn only_gateway_style_statuses_are_transient() {
        let s = |status| FetchError::Status { url: "u".into(), status };
        assert!(s(503).is_transient());
        assert!(s(502).is_transient());
        assert!(!s(404).is_transient());
        assert!(!FetchError::NotAnObject { url: "u".into() }.is_transient());
    }

    mod over_http {
        use std::net::Ipv4Addr;
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::{Arc, Mutex};

        use axum::extract::State;
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::get;
        use axum::Router;

        use super::*;

        /// Answers 503 for the first `unavailable` hits, then `status` with `body`.
        #[derive(Clone)]
        struct Upstream {
            hits: Arc<AtomicU32>,
            auth: Arc<Mutex<Vec<String>>>,
            unavailable: u32,
            status: u16,
            body: &'static str,
        }

        impl Upstream {
            fn new(unavailable: u32, status: u16, body: &'static str) -> Self {
                Self { hits: Arc::default(), auth: Arc::default(), unavailable, status, body }
            }

            fn hits(&self) -> u32 { self.hits.load(Ordering::SeqCst) }
        }

        async fn services(State(up): State<Upstream>, headers: HeaderMap) -> (StatusCode, String) {
            let n = up.hits.fetch_add(1, Ordering::SeqCst);
            if let Some(v) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                up.auth.lock().unwrap().push(v.to_string());
            }
            if n < up.unavailable {
                return (StatusCode::SERVICE_UNAVAILABLE, String::new());
            }
            (StatusCode::from_u16(up.status).unwrap(), up.body.to_string())
        }

        async fn serve(up: Upstream) -> String {
            let app = Router::new().route("/v1/services", get(services)).with_state(up);
            let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let _ = axum::serve(listener, app).await;
            });
            format!("http://{}/v1/", addr)
        }

        fn retrying(max_attempts: u32) -> RetryPolicy {
            RetryPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(5), true)
        }

        fn client(base: &str, retry: RetryPolicy) -> HttpClient {
            HttpClient::new(base, "s3cret", Duration::from_secs(5), retry).unwrap()
        }

        #[tokio::test]
        async fn sends_bearer_token_and_returns_object() {
            let up = Upstream::new(0, 200, r#"{"data":[{"id":1}]}"#);
            let base = serve(up.clone()).await;

            let map = client(&base, RetryPolicy::disabled()).get("/services").await.unwrap();
            assert!(map["data"].is_array());
            assert_eq!(up.hits(), 1);
            assert_eq!(*up.auth.lock().unwrap(), vec!["Bearer s3cret".to_string()]);
        }

        #[tokio::test]
        async fn retries_unavailable_until_success() {
            let up = Upstream::new(2, 200, r#"{"data":[]}"#);
            let base = serve(up.clone()).await;

            let map = client(&base, retrying(3)).get("services").await.unwrap();
            assert!(map.contains_key("data"));
            assert_eq!(up.hits(), 3);
        }

        #[tokio::test]
        async fn gives_up_after_max_attempts_with_status_error() {
            let up = Upstream::new(u32::MAX, 200, "{}");
            let base = serve(up.clone()).await;

            let err = client(&base, retrying(3)).get("/services").await.unwrap_err();
            assert!(matches!(err, FetchError::Status { status: 503, .. }), "{err:?}");
            assert_eq!(up.hits(), 3);
        }

        #[tokio::test]
        async fn client_errors_are_not_retried() {
            let up = Upstream::new(0, 404, r#"{"error":"nope"}"#);
            let base = serve(up.clone()).await;

            let err = client(&base, retrying(3)).get("/services").await.unwrap_err();
            assert!(matches!(err, FetchError::Status { status: 404, .. }), "{err:?}");
            assert_eq!(up.hits(), 1);
        }

        #[tokio::test]
        async fn top_level_array_is_rejected() {
            let up = Upstream::new(0, 200, r#"[{"id":1}]"#);
            let base = serve(up.clone()).await;

            let err = client(&base, retrying(3)).get("/services").await.unwrap_err();
            assert!(matches!(err, FetchError::NotAnObject { .. }), "{err:?}");
            assert_eq!(up.hits(), 1);
        }

        #[tokio::test]
        async fn refused_connection_is_a_transient_transport_error() {
            let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let err = client(&format!("http://{}/v1", addr), RetryPolicy::disabled())
                .get("/services")
                .await
                .unwrap_err();
            assert!(matches!(err, FetchError::Transport { transient: true, .. }), "{err:?}");
        }
    }
}
