//! The fixed category list used for spending analytics and the color palette
//! that transactions may use for display.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The fixed set of categories used for the dashboard's spending breakdown,
/// in the order they are reported. Ties in spending totals resolve to the
/// earlier entry.
pub const CATEGORIES: [&str; 6] = [
    "Food",
    "Transport",
    "Entertainment",
    "Shopping",
    "Bills",
    "Other",
];

/// The colors that a transaction's category may be displayed with.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#EF4444", "#3B82F6", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#6366F1", "#6B7280",
];

/// The color assigned to transactions that do not specify one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// The display color for a fixed category in dashboard charts.
///
/// Categories outside the fixed list fall back to the "Other" gray.
pub fn display_color(category: &str) -> &'static str {
    match category {
        "Food" => "#10B981",
        "Transport" => "#3B82F6",
        "Entertainment" => "#8B5CF6",
        "Shopping" => "#EC4899",
        "Bills" => "#F59E0B",
        _ => "#6B7280",
    }
}

/// A validated, trimmed category name of at least two characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidCategoryName] if `name` has fewer than two
    /// characters after trimming whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.chars().count() < 2 {
            Err(Error::InvalidCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is trimmed and at least two
    /// characters long.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the length invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category color validated against [CATEGORY_PALETTE].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Create a category color from a hex string such as "#3B82F6".
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidCategoryColor] if `color` is not one of the
    /// eight palette colors.
    pub fn new(color: &str) -> Result<Self, Error> {
        if CATEGORY_PALETTE.contains(&color) {
            Ok(Self(color.to_string()))
        } else {
            Err(Error::InvalidCategoryColor(color.to_string()))
        }
    }

    /// Create a category color without validation.
    ///
    /// The caller should ensure that the string is one of the palette colors.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the palette invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl Default for CategoryColor {
    fn default() -> Self {
        Self(DEFAULT_CATEGORY_COLOR.to_string())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
