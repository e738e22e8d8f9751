//! Bearer token gate for protected routes.
//!
//! Each request is checked in order: bearer token present, token active
//! according to the authorization server, required scope granted, session
//! cached for the token. The first failing step decides the rejection.
//! Failure detail goes to the log only.

use crate::errors::ApiError;
use crate::oauth_client::{TokenInfo, TokenServiceError};
use crate::session::SessionRecord;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Authenticated customer attached to the request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    #[serde(rename = "ID")]
    pub id: u64,
    pub name: String,
    pub phone: String,
}

impl From<SessionRecord> for Identity {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: record.customer_id,
            name: record.name,
            phone: record.phone,
        }
    }
}

/// The raw bearer token of an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Why the gate turned a request away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No usable `Authorization: Bearer` header
    Unauthorized,
    /// Introspection failed or reported the token inactive
    InvalidToken,
    /// The token lacks the required scope
    InsufficientScope,
    /// The token is active but no session is cached for it
    SessionExpired,
    /// The session backend failed
    Internal,
}

impl GateRejection {
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidToken | Self::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientScope => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::InvalidToken => "Invalid token",
            Self::InsufficientScope => "Insufficient scope",
            Self::SessionExpired => "Session expired",
            Self::Internal => "Internal server error",
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        ApiError::new(self.message(), self.status_code()).into_response()
    }
}

pub(crate) async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let token = match extract_bearer_token(request.headers()) {
        Some(token) => token.to_string(),
        None => {
            warn!("Rejecting request without a bearer token");
            return Err(GateRejection::Unauthorized);
        }
    };

    match introspect(&state, &token).await {
        Ok(info) if info.active => {
            let required = state.config.oauth.required_scope();
            if !info.has_scope(required) {
                warn!(
                    "Token missing required scope '{}' (granted: '{}')",
                    required, info.scope
                );
                return Err(GateRejection::InsufficientScope);
            }
        }
        Ok(info) => {
            warn!(
                "Rejecting inactive token (client: {})",
                info.client_id.as_deref().unwrap_or("unknown")
            );
            return Err(GateRejection::InvalidToken);
        }
        Err(e) => {
            warn!("Token introspection failed: {}", e);
            return Err(GateRejection::InvalidToken);
        }
    }

    let record = match state.sessions.fetch(&token).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            warn!("No session cached for an active token");
            return Err(GateRejection::SessionExpired);
        }
        Err(e) => {
            error!("Failed to fetch session: {}", e);
            return Err(GateRejection::Internal);
        }
    };

    request.extensions_mut().insert(Identity::from(record));
    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header, if well formed
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Introspect on the request's task, or on a detached task when configured
/// so that a dropped request does not abort the authorization server call.
async fn introspect(state: &AppState, token: &str) -> Result<TokenInfo, TokenServiceError> {
    if !state.config.introspection_detached {
        return state.introspector.introspect(token).await;
    }

    let introspector = Arc::clone(&state.introspector);
    let token = token.to_string();
    tokio::spawn(async move { introspector.introspect(&token).await })
        .await
        .map_err(|e| TokenServiceError::Task(e.to_string()))?
}
