use super::{OAuthClient, TokenIntrospector, TokenServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Introspection response (RFC 7662).
///
/// Only `active` and `scope` drive decisions; the remaining members are kept
/// for logging and cache bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct TokenInfo {
    #[serde(default)]
    pub active: bool,
    /// Space-delimited granted scopes
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scope: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry as seconds since the Unix epoch
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenInfo {
    /// Whether `required` is one of the space-separated granted scopes.
    /// An empty requirement is always satisfied.
    pub fn has_scope(&self, required: &str) -> bool {
        if required.is_empty() {
            return true;
        }
        self.scope.split(' ').any(|granted| granted == required)
    }

    /// Whether the token reports an expiry within `window` from now
    pub fn expires_within(&self, window: Duration) -> bool {
        let Some(exp) = self.exp else {
            return false;
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        exp <= now.saturating_add(window.as_secs())
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl OAuthClient {
    /// Ask the authorization server whether `token` is active and which
    /// scopes it carries. Results are not cached here.
    pub async fn introspect_token(&self, token: &str) -> Result<TokenInfo, TokenServiceError> {
        let url = self.config.introspection_url().ok_or_else(|| {
            TokenServiceError::Config("introspection URL is not configured".to_string())
        })?;

        self.post_form(url, &[("token", token)]).await
    }
}

#[async_trait]
impl TokenIntrospector for OAuthClient {
    async fn introspect(&self, token: &str) -> Result<TokenInfo, TokenServiceError> {
        self.introspect_token(token).await
    }
}
