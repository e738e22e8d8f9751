use crate::config::OAuthConfig;
use async_trait::async_trait;
use http::header::ACCEPT;
use http::StatusCode;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// Reexport modules
pub mod cached;
pub mod client_credentials;
pub mod introspection;

pub use cached::CachedIntrospector;
pub use introspection::TokenInfo;

/// Errors that can occur when talking to the authorization server
#[derive(Debug, Error)]
pub enum TokenServiceError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to send request to authorization server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Authorization server request failed with status: {0}")]
    InvalidStatus(StatusCode),
    #[error("Authorization server returned an empty access token")]
    MissingAccessToken,
    #[error("Failed to parse authorization server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Introspection task failed: {0}")]
    Task(String),
}

/// Validates bearer tokens.
///
/// The auth gate depends on this trait rather than on [`OAuthClient`] so the
/// introspection strategy (direct, cached, stubbed) is chosen by whoever
/// builds the application state.
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    async fn introspect(&self, token: &str) -> Result<TokenInfo, TokenServiceError>;
}

#[async_trait]
impl<T: TokenIntrospector + ?Sized> TokenIntrospector for Arc<T> {
    async fn introspect(&self, token: &str) -> Result<TokenInfo, TokenServiceError> {
        (**self).introspect(token).await
    }
}

/// Client for the OAuth 2.0 authorization server.
///
/// Every request authenticates with HTTP basic auth using the configured
/// client id and secret. Nothing is retried.
#[derive(Clone)]
pub struct OAuthClient {
    http: Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(
        config: OAuthConfig,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;
        Ok(Self { http, config })
    }

    /// POST a form to the authorization server and decode the JSON answer.
    ///
    /// Anything but `200 OK` is a protocol failure.
    async fn post_form<R: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<R, TokenServiceError> {
        debug!("Sending request to authorization server at: {}", url);

        let response = self
            .http
            .post(url)
            .basic_auth(
                self.config.client_id().unwrap_or_default(),
                self.config.client_secret(),
            )
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(TokenServiceError::InvalidStatus(response.status()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
