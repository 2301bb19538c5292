//! The API endpoints for creating, listing, updating and deleting
//! transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, DatabaseId, Error, UserID,
    category::{CategoryColor, CategoryName},
    timezone::get_local_offset,
    transaction::{
        NewTransaction, TransactionKind, create_transaction, delete_transaction, get_transaction,
        get_transactions, update_transaction,
    },
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionApiState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone name used when a new transaction does not
    /// specify a date, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The JSON payload for creating a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    /// The value of the transaction.
    pub amount: f64,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: String,
    /// The name of the category the transaction belongs to.
    pub category_name: String,
    /// The display color for the category. Defaults to blue when omitted.
    #[serde(default)]
    pub category_color: Option<String>,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// The date when the transaction occurred. Defaults to today when omitted.
    #[serde(default)]
    pub date: Option<Date>,
}

/// The JSON payload for updating a transaction. Fields that are omitted keep
/// their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionData {
    /// The value of the transaction.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Either "income" or "expense".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// The name of the category the transaction belongs to.
    #[serde(default)]
    pub category_name: Option<String>,
    /// The display color for the category.
    #[serde(default)]
    pub category_color: Option<String>,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// The date when the transaction occurred.
    #[serde(default)]
    pub date: Option<Date>,
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionApiState>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<TransactionData>,
) -> Result<Response, Error> {
    if !(data.amount.is_finite() && data.amount > 0.0) {
        return Err(Error::InvalidAmount);
    }

    let kind: TransactionKind = data.kind.parse()?;
    let category_name = CategoryName::new(&data.category_name)?;
    let category_color = match data.category_color {
        Some(color) => CategoryColor::new(&color)?,
        None => CategoryColor::default(),
    };
    let date = match data.date {
        Some(date) => date,
        None => today(&state.local_timezone)?,
    };

    let new_transaction = NewTransaction::build(
        user_id,
        category_name,
        category_color,
        data.amount,
        kind,
        data.description.unwrap_or_default(),
        date,
    )?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = create_transaction(new_transaction, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Transaction added",
            "transaction": transaction,
        })),
    )
        .into_response())
}

/// A route handler for listing all of the user's transactions, most recent
/// first.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionApiState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let transactions = get_transactions(user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "transactions": transactions,
    }))
    .into_response())
}

/// A route handler for fetching a single transaction owned by the user.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionApiState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = get_transaction(transaction_id, user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Transaction found",
        "transaction": transaction,
    }))
    .into_response())
}

/// A route handler for updating a transaction owned by the user.
///
/// Omitted fields keep their stored values. Provided fields are validated the
/// same way as when creating a transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionApiState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseId>,
    Json(data): Json<UpdateTransactionData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let mut transaction = get_transaction(transaction_id, user_id, &connection)
        .map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingTransaction,
            other => other,
        })?;

    if let Some(color) = data.category_color {
        transaction.category_color = CategoryColor::new(&color)?;
    }

    if let Some(kind) = data.kind {
        transaction.kind = kind.parse()?;
    }

    if let Some(name) = data.category_name {
        transaction.category_name = CategoryName::new(&name)?;
    }

    if let Some(amount) = data.amount {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Error::InvalidAmount);
        }

        transaction.amount = amount;
    }

    if let Some(description) = data.description {
        transaction.description = description;
    }

    if let Some(date) = data.date {
        transaction.date = date;
    }

    update_transaction(&transaction, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Transaction updated",
        "transaction": transaction,
    }))
    .into_response())
}

/// A route handler for deleting a transaction owned by the user.
///
/// The response echoes the deleted transaction under the `deleted` key.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionApiState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)
        .map_err(|error| match error {
            Error::NotFound => Error::DeleteMissingTransaction,
            other => other,
        })?;

    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Transaction deleted successfully",
        "deleted": transaction,
    }))
    .into_response())
}

fn today(local_timezone: &str) -> Result<Date, Error> {
    get_local_offset(local_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
        .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_string()))
}
