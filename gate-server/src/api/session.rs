use crate::api::auth_gate::{BearerToken, Identity};
use crate::errors::{ApiError, ErrorBody};
use crate::openapi::SESSION_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use log::{error, info};

/// Identity of the authenticated customer
#[utoipa::path(
    get,
    path = "/me",
    tag = SESSION_TAG,
    responses(
        (status = 200, description = "Authenticated customer", body = Identity),
        (status = 401, description = "Missing, invalid or expired credentials", body = ErrorBody),
        (status = 403, description = "Token lacks the required scope", body = ErrorBody),
        (status = 500, description = "Session backend failure", body = ErrorBody),
    )
)]
pub(crate) async fn me(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}

/// End the session bound to the presented token.
///
/// The token itself stays valid at the authorization server; later requests
/// with it are rejected with "Session expired".
#[utoipa::path(
    post,
    path = "/logout",
    tag = SESSION_TAG,
    responses(
        (status = 204, description = "Session removed"),
        (status = 401, description = "Missing, invalid or expired credentials", body = ErrorBody),
        (status = 403, description = "Token lacks the required scope", body = ErrorBody),
        (status = 500, description = "Session backend failure", body = ErrorBody),
    )
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
) -> Result<StatusCode, ApiError> {
    state.sessions.delete(&token.0).await.map_err(|e| {
        error!("Failed to delete session for customer {}: {}", identity.id, e);
        ApiError::internal()
    })?;
    info!("Customer {} logged out", identity.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Routes that need an authenticated session; the caller adds the gate
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}
