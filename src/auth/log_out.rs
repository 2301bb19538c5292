//! The endpoint for logging out the current user.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::cookie::invalidate_auth_cookie;

/// A route handler for logging out the current user.
///
/// Invalidates the auth cookies so the client deletes them. Logging out
/// without being logged in is not an error.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (
        jar,
        Json(json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
        .into_response()
}
