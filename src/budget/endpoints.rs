//! The API endpoints for creating, listing, updating and deleting budgets.

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
    budget::{
        BudgetPeriod, NewBudget, create_budget, delete_budget, get_budget, get_budgets,
        update_budget,
    },
    timezone::get_local_offset,
};

/// The state needed for the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetApiState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone name used when a new budget does not specify a
    /// starting date, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The JSON payload for creating a budget.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetData {
    /// The spending limit.
    pub amount: f64,
    /// One of "weekly", "monthly", "yearly" or "custom". Defaults to monthly
    /// when omitted.
    #[serde(default, rename = "type")]
    pub period: Option<String>,
    /// The name of the category the budget applies to.
    pub category_name: String,
    /// The date the budget takes effect from. Defaults to today when omitted.
    #[serde(default)]
    pub starting_date: Option<Date>,
    /// A text description of the budget.
    #[serde(default)]
    pub description: Option<String>,
}

/// The JSON payload for updating a budget. Fields that are omitted keep their
/// stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetData {
    /// The spending limit.
    #[serde(default)]
    pub amount: Option<f64>,
    /// One of "weekly", "monthly", "yearly" or "custom".
    #[serde(default, rename = "type")]
    pub period: Option<String>,
    /// The name of the category the budget applies to.
    #[serde(default)]
    pub category_name: Option<String>,
    /// The date the budget takes effect from.
    #[serde(default)]
    pub starting_date: Option<Date>,
    /// A text description of the budget.
    #[serde(default)]
    pub description: Option<String>,
}

/// A route handler for creating a new budget.
pub async fn create_budget_endpoint(
    State(state): State<BudgetApiState>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<BudgetData>,
) -> Result<Response, Error> {
    let period = match data.period {
        Some(period) => period.parse()?,
        None => BudgetPeriod::default(),
    };

    if !(data.amount.is_finite() && data.amount > 0.0) {
        return Err(Error::InvalidBudgetAmount);
    }

    let starting_date = match data.starting_date {
        Some(starting_date) => starting_date,
        None => today(&state.local_timezone)?,
    };

    let new_budget = NewBudget::build(
        user_id,
        &data.category_name,
        period,
        data.amount,
        starting_date,
        data.description.unwrap_or_default(),
    )?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let budget = create_budget(new_budget, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Budget created successfully",
            "budget": budget,
        })),
    )
        .into_response())
}

/// A route handler for listing all of the user's budgets, latest starting
/// date first.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetApiState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let budgets = get_budgets(user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "budgets": budgets,
    }))
    .into_response())
}

/// A route handler for fetching a single budget owned by the user.
pub async fn get_budget_endpoint(
    State(state): State<BudgetApiState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let budget = get_budget(budget_id, user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Budget found",
        "budget": budget,
    }))
    .into_response())
}

/// A route handler for updating a budget owned by the user.
///
/// Omitted fields keep their stored values.
pub async fn update_budget_endpoint(
    State(state): State<BudgetApiState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<DatabaseId>,
    Json(data): Json<UpdateBudgetData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let mut budget =
        get_budget(budget_id, user_id, &connection).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingBudget,
            other => other,
        })?;

    if let Some(period) = data.period {
        budget.period = period.parse()?;
    }

    if let Some(amount) = data.amount {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Error::InvalidBudgetAmount);
        }

        budget.amount = amount;
    }

    if let Some(name) = data.category_name {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::InvalidBudgetCategory);
        }

        budget.category_name = name.to_string();
    }

    if let Some(starting_date) = data.starting_date {
        budget.starting_date = starting_date;
    }

    if let Some(description) = data.description {
        budget.description = description;
    }

    update_budget(&budget, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Budget updated successfully",
        "budget": budget,
    }))
    .into_response())
}

/// A route handler for deleting a budget owned by the user.
///
/// The response echoes the deleted budget under the `deleted` key.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetApiState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(budget_id, user_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingBudget,
        other => other,
    })?;

    delete_budget(budget_id, user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Budget deleted successfully",
        "deleted": budget,
    }))
    .into_response())
}

fn today(local_timezone: &str) -> Result<Date, Error> {
    get_local_offset(local_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
        .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_string()))
}
