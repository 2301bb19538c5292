//! The dashboard: pure aggregation over transactions and budgets, and the
//! endpoints that serve the results.

pub mod aggregation;
mod endpoints;

pub use endpoints::{get_dashboard_endpoint, get_spending_endpoint};
