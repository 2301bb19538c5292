//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, PasswordHash,
    user::{Currency, create_user},
};

/// The state needed for the registration endpoint.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON payload for registering a user.
#[derive(Debug, Deserialize)]
pub struct RegisterData {
    /// The user's display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The user's email address.
    #[serde(default)]
    pub email: Option<String>,
    /// The user's plain text password.
    #[serde(default)]
    pub password: Option<String>,
    /// The user's preferred currency code. Defaults to PKR when omitted.
    #[serde(default)]
    pub currency: Option<String>,
}

/// A route handler for registering a new user.
///
/// All validation failures are collected and reported together, rather than
/// stopping at the first one.
pub async fn register_user_endpoint(
    State(state): State<RegistrationState>,
    Json(data): Json<RegisterData>,
) -> Result<Response, Error> {
    let mut errors = Vec::new();

    let name = data.name.as_deref().unwrap_or_default().trim().to_string();
    if name.chars().count() < 2 {
        errors.push("name must be at least 2 characters");
    }

    let email = data
        .email
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if !EmailAddress::is_valid(&email) {
        errors.push("enter a valid email address");
    }

    let password = data.password.as_deref().unwrap_or_default();
    if password.chars().count() < 6 {
        errors.push("password must be at least 6 characters");
    }

    let currency = match data.currency.as_deref() {
        None => Currency::default(),
        Some(raw_currency) => raw_currency.parse().unwrap_or_else(|_| {
            errors.push("Currency must be one of: USD, INR, PKR, EUR");
            Currency::default()
        }),
    };

    if !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "validation failed",
                "errors": errors,
            })),
        )
            .into_response());
    }

    let password_hash = PasswordHash::from_raw_password(password, PasswordHash::DEFAULT_COST)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let user = create_user(&name, &email, password_hash, currency, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "user registered successfully",
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
