use crate::api::auth_gate::Identity;
use crate::api::{health, session};
use crate::errors::ErrorBody;
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const SESSION_TAG: &str = "Session API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = SESSION_TAG, description = "Endpoints behind the bearer token gate"),
    ),
    paths(
        health::health_check,
        health::ready_check,
        session::me,
        session::logout,
    ),
    components(schemas(Identity, ErrorBody, health::Health)),
    info(
        title = "Gate API",
        description = "Bearer token gate backed by OAuth 2.0 introspection and cached sessions",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
