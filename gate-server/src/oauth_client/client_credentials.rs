use super::{OAuthClient, TokenServiceError};
use log::debug;
use serde::Deserialize;

/// Token endpoint response for the client credentials grant (RFC 6749 Section 4.4.3)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

impl OAuthClient {
    /// Obtain an access token for this service via the client credentials grant.
    ///
    /// Used when the service itself calls another protected service. The
    /// token is returned as is; callers own caching and retry.
    pub async fn acquire_service_token(&self) -> Result<String, TokenServiceError> {
        let (Some(url), Some(_), Some(_)) = (
            self.config.token_url(),
            self.config.client_id(),
            self.config.client_secret(),
        ) else {
            return Err(TokenServiceError::Config(
                "client credentials are not configured".to_string(),
            ));
        };

        let mut form = vec![("grant_type", "client_credentials")];
        if let Some(scope) = self.config.token_scope() {
            form.push(("scope", scope));
        }

        let response: TokenResponse = self.post_form(url, &form).await?;
        if response.access_token.is_empty() {
            return Err(TokenServiceError::MissingAccessToken);
        }

        debug!(
            "Acquired service token (type: {}, scope: '{}', expires in: {:?}s)",
            response.token_type.as_deref().unwrap_or("unknown"),
            response.scope.as_deref().unwrap_or_default(),
            response.expires_in
        );
        Ok(response.access_token)
    }
}
