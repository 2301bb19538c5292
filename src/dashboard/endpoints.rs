//! The API endpoints serving the dashboard's aggregated views.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserID,
    budget::{Budget, get_budgets},
    category::display_color,
    dashboard::aggregation::{
        BucketKind, budget_progress, budget_rollup, category_share, category_totals,
        most_spent_category, spending_series, totals,
    },
    timezone::get_local_offset,
    transaction::{TransactionKind, get_transactions},
};

/// How many recent transactions and budgets the dashboard overview includes.
const RECENT_COUNT: usize = 4;

/// The state needed for the dashboard endpoints.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone name used to anchor the spending series to
    /// today, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A budget annotated with how much of it the user's spending has consumed.
#[derive(Serialize)]
struct BudgetProgressEntry<'a> {
    #[serde(flatten)]
    budget: &'a Budget,
    progress: u8,
}

/// A route handler for the dashboard overview: overall totals, the budget
/// rollup, and the most recent transactions and budgets.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (transactions, budgets) = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_transactions(user_id, &connection)?,
            get_budgets(user_id, &connection)?,
        )
    };

    let totals = totals(&transactions);
    let rollup = budget_rollup(&budgets, totals.expenses);

    let recent_budgets: Vec<BudgetProgressEntry> = budgets
        .iter()
        .take(RECENT_COUNT)
        .map(|budget| BudgetProgressEntry {
            budget,
            progress: budget_progress(budget.amount, totals.expenses),
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "totals": totals,
        "budget": rollup,
        "budgets": recent_budgets,
        "recentTransactions": &transactions[..transactions.len().min(RECENT_COUNT)],
    }))
    .into_response())
}

/// The query parameters for the spending endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SpendingQuery {
    /// Either "weekly" or "monthly". Anything else, including omitting the
    /// parameter, selects the monthly view.
    #[serde(default)]
    pub range: Option<String>,
}

/// One category's row in the spending breakdown.
#[derive(Serialize)]
struct BreakdownEntry {
    category: &'static str,
    color: &'static str,
    total: f64,
    share: f64,
    count: usize,
}

/// A route handler for the spending analysis: the time-bucketed series, the
/// per-category breakdown and summary statistics.
pub async fn get_spending_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<SpendingQuery>,
) -> Result<Response, Error> {
    let bucket_kind = match query.range.as_deref() {
        Some("weekly") => BucketKind::Weekly,
        _ => BucketKind::Monthly,
    };

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(user_id, &connection)?
    };

    let series = spending_series(&transactions, bucket_kind, today(&state.local_timezone)?);

    let expense_total = totals(&transactions).expenses;
    let breakdown: Vec<BreakdownEntry> = category_totals(&transactions)
        .into_iter()
        .filter(|&(_, total)| total > 0.0)
        .map(|(category, total)| BreakdownEntry {
            category,
            color: display_color(category),
            total,
            share: category_share(total, expense_total),
            count: transactions
                .iter()
                .filter(|transaction| {
                    transaction.kind == TransactionKind::Expense
                        && transaction.category_name.as_ref() == category
                })
                .count(),
        })
        .collect();

    let expense_count = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .count();
    let average_per_transaction = if expense_count > 0 {
        expense_total / expense_count as f64
    } else {
        0.0
    };

    Ok(Json(json!({
        "success": true,
        "labels": series.labels,
        "series": series.series,
        "breakdown": breakdown,
        "summary": {
            "totalExpenses": expense_total,
            "transactionCount": expense_count,
            "averagePerTransaction": average_per_transaction,
            "mostSpentCategory": most_spent_category(&transactions),
        },
    }))
    .into_response())
}

fn today(local_timezone: &str) -> Result<Date, Error> {
    get_local_offset(local_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
        .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_string()))
}
