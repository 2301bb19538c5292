//! Budgets: the domain model, database operations and API endpoints.

mod db;
mod endpoints;
mod models;

pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, get_budgets, update_budget,
};
pub use endpoints::{
    create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint, get_budgets_endpoint,
    update_budget_endpoint,
};
pub use models::{Budget, BudgetPeriod, NewBudget};
