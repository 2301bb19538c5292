//! Database initialization.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, budget::create_budget_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the application's tables if they do not exist.
///
/// # Errors
///
/// Returns an error if any of the table creation queries fail.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
