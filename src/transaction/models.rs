//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    DatabaseId, Error, UserID,
    category::{CategoryColor, CategoryName},
};

/// Whether a transaction adds to or subtracts from the user's balance.
///
/// The direction of a transaction is always carried by its kind, never by a
/// negative amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The lowercase name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionKind(other.to_string())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense record belonging to one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The ID of the user who owns the transaction.
    #[serde(rename = "user")]
    pub user_id: UserID,
    /// The name of the category the transaction belongs to.
    pub category_name: CategoryName,
    /// The display color of the category, one of the fixed palette.
    pub category_color: CategoryColor,
    /// The value of the transaction, always strictly positive.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A text description of what the transaction was for. May be empty.
    pub description: String,
    /// The date when the transaction occurred.
    pub date: Date,
}

/// The validated data needed to insert a new transaction.
///
/// Use [NewTransaction::build] to create one. Validation happens in the field
/// types ([CategoryName], [CategoryColor]) and in the amount check, so a value
/// of this type is always safe to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The ID of the user who will own the transaction.
    pub user_id: UserID,
    /// The name of the category the transaction belongs to.
    pub category_name: CategoryName,
    /// The display color of the category.
    pub category_color: CategoryColor,
    /// The value of the transaction.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The date when the transaction occurred.
    pub date: Date,
}

impl NewTransaction {
    /// Validate and assemble the data for a new transaction.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `amount` is not strictly positive
    /// or is not a finite number.
    pub fn build(
        user_id: UserID,
        category_name: CategoryName,
        category_color: CategoryColor,
        amount: f64,
        kind: TransactionKind,
        description: String,
        date: Date,
    ) -> Result<Self, Error> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Error::InvalidAmount);
        }

        Ok(Self {
            user_id,
            category_name,
            category_color,
            amount,
            kind,
            description,
            date,
        })
    }
}

#[cfg(test)]
mod transaction_kind_tests {
    use crate::{Error, transaction::TransactionKind};

    #[test]
    fn parses_income_and_expense() {
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse(), Ok(TransactionKind::Expense));
    }

    #[test]
    fn rejects_other_strings() {
        assert_eq!(
            "transfer".parse::<TransactionKind>(),
            Err(Error::InvalidTransactionKind("transfer".to_string()))
        );
    }
}
