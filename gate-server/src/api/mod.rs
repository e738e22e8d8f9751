pub mod auth_gate;
pub(crate) mod health;
pub(crate) mod session;

use crate::api::auth_gate::auth_gate;
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(protected_routes(state))
}

/// Routes that require an active token with a cached session
fn protected_routes(state: &AppState) -> Router<AppState> {
    // route_layer so unmatched paths fall through to 404 instead of 401
    session::router().route_layer(middleware::from_fn_with_state(state.clone(), auth_gate))
}
