//! Core budget domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{DatabaseId, Error, UserID};

/// How often a budget resets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// The budget resets every week.
    Weekly,
    /// The budget resets every month (the default).
    #[default]
    Monthly,
    /// The budget resets every year.
    Yearly,
    /// The budget covers a period chosen by the user.
    Custom,
}

impl BudgetPeriod {
    /// The lowercase name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
            BudgetPeriod::Custom => "custom",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            "custom" => Ok(BudgetPeriod::Custom),
            other => Err(Error::InvalidBudgetPeriod(other.to_string())),
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit for a category over a period, belonging to one user.
///
/// Budgets are linked to transactions by category name only, there is no
/// foreign key between the two.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseId,
    /// The ID of the user who owns the budget.
    #[serde(rename = "user")]
    pub user_id: UserID,
    /// The name of the category the budget applies to.
    pub category_name: String,
    /// How often the budget resets.
    #[serde(rename = "type")]
    pub period: BudgetPeriod,
    /// The spending limit, always strictly positive.
    pub amount: f64,
    /// The date the budget takes effect from.
    pub starting_date: Date,
    /// A text description of the budget. May be empty.
    pub description: String,
}

/// The validated data needed to insert a new budget.
///
/// Use [NewBudget::build] to create one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The ID of the user who will own the budget.
    pub user_id: UserID,
    /// The name of the category the budget applies to.
    pub category_name: String,
    /// How often the budget resets.
    pub period: BudgetPeriod,
    /// The spending limit.
    pub amount: f64,
    /// The date the budget takes effect from.
    pub starting_date: Date,
    /// A text description of the budget.
    pub description: String,
}

impl NewBudget {
    /// Validate and assemble the data for a new budget.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidBudgetAmount] if `amount` is not strictly
    /// positive or is not a finite number, or an [Error::InvalidBudgetCategory]
    /// if `category_name` is empty after trimming.
    pub fn build(
        user_id: UserID,
        category_name: &str,
        period: BudgetPeriod,
        amount: f64,
        starting_date: Date,
        description: String,
    ) -> Result<Self, Error> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Error::InvalidBudgetAmount);
        }

        let category_name = category_name.trim();

        if category_name.is_empty() {
            return Err(Error::InvalidBudgetCategory);
        }

        Ok(Self {
            user_id,
            category_name: category_name.to_string(),
            period,
            amount,
            starting_date,
            description,
        })
    }
}
