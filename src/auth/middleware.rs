//! Authentication middleware that validates cookies and extends sessions.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState,
    auth::cookie::{
        COOKIE_EXPIRY, extend_auth_cookie_duration_if_needed, extract_date_time,
        get_user_id_from_auth_cookie,
    },
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid authorization cookie.
/// The user ID is placed into the request and the request executed normally
/// if the cookie is valid, otherwise a 401 JSON response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}");
            return not_logged_in_response();
        }
    };

    let user_id = match get_user_id_from_auth_cookie(&jar) {
        Ok(user_id) => user_id,
        Err(_) => return not_logged_in_response(),
    };

    let expiry = jar
        .get(COOKIE_EXPIRY)
        .and_then(|cookie| extract_date_time(&cookie).ok());

    match expiry {
        Some(expiry) if expiry > OffsetDateTime::now_utc() => {}
        _ => return not_logged_in_response(),
    }

    parts.extensions.insert(user_id);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

fn not_logged_in_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "message": "Please log in first",
        })),
    )
        .into_response()
}
