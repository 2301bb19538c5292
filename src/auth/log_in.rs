//! The endpoint for logging in a user with their email and password.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::{AppState, Error, auth::cookie::set_auth_cookie, user::get_user_by_email};

/// The state needed for the log in endpoint.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The JSON payload for logging in.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The user's email address.
    pub email: String,
    /// The user's plain text password.
    pub password: String,
}

/// A route handler for logging in a user.
///
/// Checks the email and password against the stored credentials and, on
/// success, sets the auth cookies and returns the user's details. A wrong
/// email produces the same error as a wrong password so that the response
/// does not reveal which emails are registered.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Json(data): Json<LogInData>,
) -> Result<Response, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_email(&data.email.to_lowercase(), &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            other => other,
        })?
    };

    let password_is_valid = user
        .password_hash
        .verify(&data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_valid {
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), state.cookie_duration.to_string())
    })?;

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Logged in successfully",
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "currency": user.currency,
            },
        })),
    )
        .into_response())
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use sha2::Digest;

    use crate::{
        PasswordHash,
        auth::cookie::{COOKIE_EXPIRY, COOKIE_USER_ID, DEFAULT_COOKIE_DURATION},
        db::initialize,
        endpoints,
        user::{Currency, create_user},
    };

    use super::{LogInState, log_in_endpoint};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let password_hash =
            PasswordHash::from_raw_password("hunter22", 4).expect("Could not hash password");
        create_user(
            "Ayesha",
            "ayesha@example.com",
            password_hash,
            Currency::PKR,
            &connection,
        )
        .expect("Could not create test user");

        let hash = sha2::Sha512::digest("42");
        let state = LogInState {
            cookie_key: Key::from(&hash),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(log_in_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "ayesha@example.com", "password": "hunter22"}))
            .await;

        response.assert_status_ok();
        assert!(response.maybe_cookie(COOKIE_USER_ID).is_some());
        assert!(response.maybe_cookie(COOKIE_EXPIRY).is_some());
    }

    #[tokio::test]
    async fn log_in_is_case_insensitive_on_email() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "Ayesha@Example.com", "password": "hunter22"}))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "ayesha@example.com", "password": "wrong password"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({
            "success": false,
            "message": "Invalid email or password",
        }));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "nobody@example.com", "password": "hunter22"}))
            .await;

        // Same error as a wrong password so the response does not reveal
        // which emails are registered.
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({
            "success": false,
            "message": "Invalid email or password",
        }));
    }
}
