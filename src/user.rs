//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The currency a user's amounts are displayed in.
///
/// The server never formats amounts, it only reports the code alongside raw
/// numbers so the client can format them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// United States dollar.
    USD,
    /// Indian rupee.
    INR,
    /// Pakistani rupee (the default).
    #[default]
    PKR,
    /// Euro.
    EUR,
}

impl Currency {
    /// The three-letter currency code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::INR => "INR",
            Currency::PKR => "PKR",
            Currency::EUR => "EUR",
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::USD),
            "INR" => Ok(Currency::INR),
            "PKR" => Ok(Currency::PKR),
            "EUR" => Ok(Currency::EUR),
            other => Err(Error::InvalidCurrency(other.to_string())),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email address, unique across all users.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The currency the user's amounts are displayed in.
    pub currency: Currency,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                currency TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns an [Error::DuplicateEmail] if a user with `email` already exists,
/// or an [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    name: &str,
    email: &str,
    password_hash: PasswordHash,
    currency: Currency,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password, currency) VALUES (?1, ?2, ?3, ?4)",
        (name, email, password_hash.as_ref(), currency.as_str()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        password_hash,
        currency,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, name, email, password, currency FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, name, email, password, currency FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_row)
        .map_err(|error| error.into())
}

fn map_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let raw_currency: String = row.get(4)?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        // The currency column is validated on insert.
        currency: raw_currency.parse().unwrap_or_default(),
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        user::{Currency, UserID, create_user, get_user_by_email, get_user_by_id},
    };

    use super::{Error, create_user_table};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn insert_test_user(connection: &Connection) -> crate::User {
        create_user(
            "Ayesha",
            "ayesha@example.com",
            PasswordHash::new_unchecked("hunter2"),
            Currency::PKR,
            connection,
        )
        .expect("Could not create test user")
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user = insert_test_user(&db_connection);

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "ayesha@example.com");
        assert_eq!(inserted_user.currency, Currency::PKR);
    }

    #[test]
    fn insert_user_fails_with_duplicate_email() {
        let db_connection = get_db_connection();
        insert_test_user(&db_connection);

        let result = create_user(
            "Another Ayesha",
            "ayesha@example.com",
            PasswordHash::new_unchecked("hunter2"),
            Currency::USD,
            &db_connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = insert_test_user(&db_connection);

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let db_connection = get_db_connection();
        let test_user = insert_test_user(&db_connection);

        let retrieved_user = get_user_by_email("ayesha@example.com", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_fails_with_unknown_email() {
        let db_connection = get_db_connection();
        insert_test_user(&db_connection);

        let result = get_user_by_email("nobody@example.com", &db_connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
