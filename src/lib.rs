//! Fintrack is a web service for tracking personal finances.
//!
//! This library provides a JSON REST API for user registration and log in,
//! CRUD over transactions and budgets, and a dashboard that reports
//! aggregated spending statistics.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod logging;
mod password;
mod register_user;
mod routing;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{Currency, User, UserID, create_user, get_user_by_email, get_user_by_id};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password with fewer characters than the allowed minimum.
    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The user's email already exists in the database. The client should try
    /// again with a different email address.
    #[error("user already exist with this email")]
    DuplicateEmail,

    /// A category name was empty or shorter than two characters after trimming.
    #[error("Category name must be at least 2 characters")]
    InvalidCategoryName,

    /// A category color was not one of the allowed palette colors.
    #[error("Invalid category color")]
    InvalidCategoryColor(String),

    /// A transaction kind string was not "income" or "expense".
    #[error("Type must be income or expense")]
    InvalidTransactionKind(String),

    /// A budget period string was not one of the allowed periods.
    #[error("please enter a valid type")]
    InvalidBudgetPeriod(String),

    /// A zero or negative amount was used for a budget.
    #[error("please enter a valid amount")]
    InvalidBudgetAmount,

    /// A budget category name was empty after trimming.
    #[error("please enter a category name")]
    InvalidBudgetCategory,

    /// A currency code was not one of the allowed currencies.
    #[error("Currency must be one of: USD, INR, PKR, EUR")]
    InvalidCurrency(String),

    /// A zero or negative amount was used for a transaction or budget.
    #[error("Amount must be positive")]
    InvalidAmount,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("failed updating Transaction")]
    UpdateMissingTransaction,

    /// Tried to delete a budget that does not exist
    #[error("Budget not found")]
    DeleteMissingBudget,

    /// Tried to update a budget that does not exist
    #[error("failed updating budget")]
    UpdateMissingBudget,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code the error maps to in a JSON response.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::CookieMissing => StatusCode::UNAUTHORIZED,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::PasswordTooShort
            | Error::InvalidCategoryName
            | Error::InvalidCategoryColor(_)
            | Error::InvalidTransactionKind(_)
            | Error::InvalidBudgetPeriod(_)
            | Error::InvalidBudgetAmount
            | Error::InvalidBudgetCategory
            | Error::InvalidCurrency(_)
            | Error::InvalidAmount => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingBudget
            | Error::UpdateMissingBudget => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details should only appear in the server logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "Server error".to_owned()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "success": false,
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn not_found_maps_to_404() {
        let response = Error::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_email_maps_to_409() {
        let response = Error::DuplicateEmail.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_credentials_maps_to_401() {
        let response = Error::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_lock_error_maps_to_500() {
        let response = Error::DatabaseLockError.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
