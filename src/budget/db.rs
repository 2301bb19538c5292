//! Database operations for budgets. All queries are scoped to the owning
//! user.

use rusqlite::{Connection, Row};

use crate::{
    DatabaseId, Error, UserID,
    budget::{Budget, NewBudget},
};

/// Create a budget and return it with its generated ID.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_id, category_name, period, amount, starting_date, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            new_budget.user_id.as_i64(),
            &new_budget.category_name,
            new_budget.period.as_str(),
            new_budget.amount,
            new_budget.starting_date,
            &new_budget.description,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Budget {
        id,
        user_id: new_budget.user_id,
        category_name: new_budget.category_name,
        period: new_budget.period,
        amount: new_budget.amount,
        starting_date: new_budget.starting_date,
        description: new_budget.description,
    })
}

/// Retrieve a single budget owned by `user_id`.
pub fn get_budget(
    budget_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_name, period, amount, starting_date, description
             FROM budget WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &budget_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all budgets owned by `user_id`, latest starting date first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_name, period, amount, starting_date, description
             FROM budget WHERE user_id = :user_id ORDER BY starting_date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Replace the contents of a budget owned by `user_id`.
///
/// Returns an error if the budget does not exist or belongs to another user.
pub fn update_budget(budget: &Budget, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget
         SET category_name = ?1, period = ?2, amount = ?3, starting_date = ?4, description = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            &budget.category_name,
            budget.period.as_str(),
            budget.amount,
            budget.starting_date,
            &budget.description,
            budget.id,
            budget.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete a budget owned by `user_id`. Returns an error if the budget does
/// not exist or belongs to another user.
pub fn delete_budget(
    budget_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Initialize the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_name TEXT NOT NULL,
            period TEXT NOT NULL,
            amount REAL NOT NULL,
            starting_date TEXT NOT NULL,
            description TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let category_name = row.get(2)?;
    let raw_period: String = row.get(3)?;
    let amount = row.get(4)?;
    let starting_date = row.get(5)?;
    let description = row.get(6)?;

    Ok(Budget {
        id,
        user_id: UserID::new(raw_user_id),
        category_name,
        // The period column is validated on insert.
        period: raw_period.parse().unwrap_or_default(),
        amount,
        starting_date,
        description,
    })
}
