use crate::cache::memory::InMemoryCache;
use crate::cache::Cache;
use crate::config::GateConfig;
use crate::create_app;
use crate::oauth_client::{TokenInfo, TokenIntrospector, TokenServiceError};
use crate::session::SessionStore;
use crate::state::AppState;
use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use base64::Engine;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Test fixture running the whole application against a mocked authorization
/// server and an in-memory session cache.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new("api").await;
///
///     // Introspection answers for one token
///     fixture
///         .mock_introspection("tok-1", json!({"active": true, "scope": "api"}), 200, 1)
///         .await;
///
///     // Seed the session the login flow would have written
///     fixture.sessions.store("tok-1", &record).await.unwrap();
///
///     let response = fixture.get("/me", Some("tok-1")).await;
///     response.assert_ok();
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration the application was built with
    pub config: GateConfig,
    /// Mock authorization server
    pub hydra_mock: MockServer,
    /// Session store sharing the application's cache
    pub sessions: SessionStore,
}

impl TestFixture {
    /// Creates a fixture whose gate requires `required_scope` (empty disables the check)
    pub async fn new(required_scope: &str) -> Self {
        Self::with_cache(required_scope, Cache::InMemory(InMemoryCache::new(16))).await
    }

    /// Creates a fixture backed by the given session cache
    pub async fn with_cache(required_scope: &str, cache: Cache) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let hydra_mock = MockServer::start().await;
        let config = GateConfig::for_test_with_mock(&hydra_mock, required_scope);

        let state =
            AppState::new(config.clone(), cache).expect("Failed to build application state");
        let sessions = state.sessions.clone();
        let app = create_app(state);

        Self {
            app,
            config,
            hydra_mock,
            sessions,
        }
    }

    /// Initializes the test logger, later calls are no-ops
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Request builder with an optional `Authorization: Bearer` header
    pub fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        bearer: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri.as_ref());
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }

    /// Sends a GET request to the specified URI
    pub async fn get(&self, uri: impl AsRef<str>, bearer: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, bearer)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request without a body to the specified URI
    pub async fn post(&self, uri: impl AsRef<str>, bearer: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::POST, uri, bearer)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and collects the status and JSON body.
    ///
    /// Empty or non-JSON bodies come back as `{}`.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse { status, json }
    }

    /// Mounts an introspection answer for a single token.
    ///
    /// The mock only matches requests carrying the fixture's client
    /// credentials and `token` in the form body, and is verified to be hit
    /// exactly `expected_calls` times when the fixture is dropped. Other
    /// tokens get a 404 from the mock server.
    pub async fn mock_introspection(
        &self,
        token: &str,
        response_body: impl Serialize,
        status_code: u16,
        expected_calls: u64,
    ) {
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/admin/oauth2/introspect"))
            .and(matchers::header(
                "authorization",
                basic_auth_header("test-client", "test-secret"),
            ))
            .and(matchers::body_string(format!("token={}", token)))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(response_body))
            .expect(expected_calls)
            .mount(&self.hydra_mock)
            .await;
    }
}

/// Response from a test request with convenient access to status and JSON body
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Shorthand for `assert_status(StatusCode::OK)`
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Converts the response body to the specified type
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}

/// Expected `Authorization` header value for HTTP basic auth
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{}:{}", client_id, client_secret);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}

/// Introspector with a fixed answer that counts its completed calls
pub struct StubIntrospector {
    answer: Option<TokenInfo>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubIntrospector {
    pub fn returning(info: TokenInfo) -> Self {
        Self {
            answer: Some(info),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers with `info` only after `delay` has passed
    pub fn slow(info: TokenInfo, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::returning(info)
        }
    }

    /// Number of calls that ran to completion
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIntrospector for StubIntrospector {
    async fn introspect(&self, _token: &str) -> Result<TokenInfo, TokenServiceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| TokenServiceError::Config("stubbed failure".to_string()))
    }
}
