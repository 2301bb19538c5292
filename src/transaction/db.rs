//! Database operations for transactions.
//!
//! All queries are scoped to the owning user. The handlers pass in the user
//! ID from the auth middleware, so a user can never read or modify another
//! user's transactions.

use rusqlite::{Connection, Row};

use crate::{
    DatabaseId, Error, UserID,
    category::{CategoryColor, CategoryName},
    transaction::{NewTransaction, Transaction},
};

/// Create a transaction and return it with its generated ID.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (user_id, category_name, category_color, amount, kind, description, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            new_transaction.user_id.as_i64(),
            new_transaction.category_name.as_ref(),
            new_transaction.category_color.as_ref(),
            new_transaction.amount,
            new_transaction.kind.as_str(),
            &new_transaction.description,
            new_transaction.date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id: new_transaction.user_id,
        category_name: new_transaction.category_name,
        category_color: new_transaction.category_color,
        amount: new_transaction.amount,
        kind: new_transaction.kind,
        description: new_transaction.description,
        date: new_transaction.date,
    })
}

/// Retrieve a single transaction owned by `user_id`.
pub fn get_transaction(
    transaction_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_name, category_color, amount, kind, description, date
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all transactions owned by `user_id`, most recent first.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_name, category_color, amount, kind, description, date
             FROM \"transaction\" WHERE user_id = :user_id ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Replace the contents of a transaction owned by `user_id`.
///
/// The caller is expected to fetch the existing transaction, merge in the
/// changed fields and pass the result back in. Returns an error if the
/// transaction does not exist or belongs to another user.
pub fn update_transaction(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET category_name = ?1, category_color = ?2, amount = ?3, kind = ?4, description = ?5, date = ?6
         WHERE id = ?7 AND user_id = ?8",
        (
            transaction.category_name.as_ref(),
            transaction.category_color.as_ref(),
            transaction.amount,
            transaction.kind.as_str(),
            &transaction.description,
            transaction.date,
            transaction.id,
            transaction.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction owned by `user_id`. Returns an error if the
/// transaction does not exist or belongs to another user.
pub fn delete_transaction(
    transaction_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_name TEXT NOT NULL,
            category_color TEXT NOT NULL,
            amount REAL NOT NULL,
            kind TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let raw_category_name: String = row.get(2)?;
    let raw_category_color: String = row.get(3)?;
    let amount = row.get(4)?;
    let raw_kind: String = row.get(5)?;
    let description = row.get(6)?;
    let date = row.get(7)?;

    Ok(Transaction {
        id,
        user_id: UserID::new(raw_user_id),
        category_name: CategoryName::new_unchecked(&raw_category_name),
        category_color: CategoryColor::new_unchecked(&raw_category_color),
        amount,
        // The kind column is validated on insert.
        kind: raw_kind.parse().unwrap_or(crate::transaction::TransactionKind::Expense),
        description,
        date,
    })
}
