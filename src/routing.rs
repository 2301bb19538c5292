//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState,
    auth::{auth_guard, log_in_endpoint, log_out_endpoint},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint, get_budgets_endpoint,
        update_budget_endpoint,
    },
    dashboard::{get_dashboard_endpoint, get_spending_endpoint},
    endpoints,
    register_user::register_user_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        get_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::USERS, post(register_user_endpoint))
        .route(endpoints::LOG_IN_API, post(log_in_endpoint))
        .route(endpoints::LOG_OUT, get(log_out_endpoint));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS_API,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(endpoints::DASHBOARD_API, get(get_dashboard_endpoint))
        .route(endpoints::DASHBOARD_SPENDING, get(get_spending_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Not found",
        })),
    )
        .into_response()
}
