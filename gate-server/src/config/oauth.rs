//! Authorization server credentials

use confique::Config;

/// Endpoints and client credentials used to talk to the OAuth 2.0 authorization server.
///
/// Every value is optional at load time. A missing endpoint or credential is
/// reported by the operation that needs it, not when the process starts.
#[derive(Config, Clone, Default)]
pub struct OAuthConfig {
    /// Token introspection endpoint (RFC 7662)
    #[config(env = "HYDRA_ADMIN_URL")]
    pub introspection_url: Option<String>,

    /// Token endpoint used for the client credentials grant
    #[config(env = "HYDRA_TOKEN_URL")]
    pub token_url: Option<String>,

    /// Client identifier sent with HTTP basic authentication
    #[config(env = "HYDRA_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret sent with HTTP basic authentication
    #[config(env = "HYDRA_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Scope requested with the client credentials grant
    #[config(env = "HYDRA_SCOPE")]
    pub token_scope: Option<String>,

    /// Scope every inbound token must carry; empty disables the check
    #[config(env = "REQUIRED_SCOPE")]
    pub required_scope: Option<String>,
}

impl OAuthConfig {
    /// Loads the configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::builder().env().load().map_err(|e| e.to_string())
    }

    pub fn introspection_url(&self) -> Option<&str> {
        non_empty(&self.introspection_url)
    }

    pub fn token_url(&self) -> Option<&str> {
        non_empty(&self.token_url)
    }

    pub fn client_id(&self) -> Option<&str> {
        non_empty(&self.client_id)
    }

    pub fn client_secret(&self) -> Option<&str> {
        non_empty(&self.client_secret)
    }

    pub fn token_scope(&self) -> Option<&str> {
        non_empty(&self.token_scope)
    }

    /// The scope required from inbound tokens, or `""` when none is configured
    pub fn required_scope(&self) -> &str {
        non_empty(&self.required_scope).unwrap_or_default()
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("introspection_url", &self.introspection_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("token_scope", &self.token_scope)
            .field("required_scope", &self.required_scope)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_oauth_config() {
        let config = OAuthConfig::default();
        assert!(config.introspection_url().is_none());
        assert!(config.token_url().is_none());
        assert!(config.client_id().is_none());
        assert!(config.client_secret().is_none());
        assert!(config.token_scope().is_none());
        assert_eq!(config.required_scope(), "");
    }

    #[test]
    fn test_blank_values_are_treated_as_unset() {
        let config = OAuthConfig {
            introspection_url: Some("  ".to_string()),
            client_id: Some("".to_string()),
            required_scope: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(config.introspection_url().is_none());
        assert!(config.client_id().is_none());
        assert_eq!(config.required_scope(), "");
    }

    #[test]
    fn test_accessors_return_configured_values() {
        let config = OAuthConfig {
            introspection_url: Some("http://hydra:4445/admin/oauth2/introspect".to_string()),
            token_url: Some("http://hydra:4444/oauth2/token".to_string()),
            client_id: Some("gate".to_string()),
            client_secret: Some("s3cret".to_string()),
            token_scope: Some("api".to_string()),
            required_scope: Some("api".to_string()),
        };
        assert_eq!(
            config.introspection_url(),
            Some("http://hydra:4445/admin/oauth2/introspect")
        );
        assert_eq!(config.token_url(), Some("http://hydra:4444/oauth2/token"));
        assert_eq!(config.client_id(), Some("gate"));
        assert_eq!(config.client_secret(), Some("s3cret"));
        assert_eq!(config.token_scope(), Some("api"));
        assert_eq!(config.required_scope(), "api");
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let config = OAuthConfig {
            client_secret: Some("s3cret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
