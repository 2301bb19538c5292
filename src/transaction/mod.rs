//! Transactions: the domain model, database operations and API endpoints.

mod db;
mod endpoints;
mod models;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};
pub use models::{NewTransaction, Transaction, TransactionKind};
