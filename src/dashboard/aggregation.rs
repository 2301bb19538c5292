//! Pure functions that turn lists of transactions and budgets into the
//! numbers the dashboard reports.
//!
//! Everything in this module is synchronous, does no I/O and never mutates
//! its inputs. Callers are responsible for passing in lists that are already
//! scoped to a single user. None of these functions panic or error: a
//! non-finite amount contributes zero, and divisions by zero yield zero.

use serde::Serialize;
use time::{Date, Duration};

use crate::{
    budget::Budget,
    category::{CATEGORIES, display_color},
    transaction::{Transaction, TransactionKind},
};

/// The number of time buckets in a spending series.
const BUCKET_COUNT: usize = 6;

/// The summed income, expenses and resulting balance of a set of
/// transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts.
    pub expenses: f64,
    /// Income minus expenses. May be negative.
    pub balance: f64,
}

/// How a user's overall spending compares to the budgets they have set up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetRollup {
    /// The sum of all budget amounts.
    pub planned: f64,
    /// The user's total expenses.
    pub spent: f64,
    /// Planned minus spent. May be negative when the user overspends.
    pub remaining: f64,
}

/// Which calendar unit a spending series is bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    /// Six week-long buckets ending today.
    Weekly,
    /// Six calendar months ending with the current month.
    Monthly,
}

/// One category's values across the buckets of a spending series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    /// The category name.
    pub name: &'static str,
    /// The category's fixed display color.
    pub color: &'static str,
    /// The summed expenses per bucket, oldest bucket first.
    pub values: Vec<f64>,
}

/// A time-bucketed breakdown of expenses by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSeries {
    /// The bucket labels, oldest first.
    pub labels: Vec<String>,
    /// One entry per category that has at least one non-zero bucket, in the
    /// fixed category order.
    pub series: Vec<CategorySeries>,
}

// Amounts come from user input via f64, so guard against NaN and infinity
// poisoning every downstream sum.
fn sanitized_amount(transaction: &Transaction) -> f64 {
    if transaction.amount.is_finite() {
        transaction.amount
    } else {
        0.0
    }
}

fn is_expense(transaction: &Transaction) -> bool {
    transaction.kind == TransactionKind::Expense
}

/// Sum a set of transactions into income, expenses and the balance.
///
/// An empty slice produces all zeros.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let income = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Income)
        .map(sanitized_amount)
        .sum();
    let expenses = transactions
        .iter()
        .filter(|transaction| is_expense(transaction))
        .map(sanitized_amount)
        .sum();

    Totals {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// Compare the sum of all budget amounts against the user's total expenses.
///
/// `spent` is the global expense total rather than a per-budget figure, so a
/// single large expense counts against every budget at once. `remaining` goes
/// negative once expenses exceed the planned total.
pub fn budget_rollup(budgets: &[Budget], expense_total: f64) -> BudgetRollup {
    let planned = budgets
        .iter()
        .map(|budget| {
            if budget.amount.is_finite() {
                budget.amount
            } else {
                0.0
            }
        })
        .sum();

    BudgetRollup {
        planned,
        spent: expense_total,
        remaining: planned - expense_total,
    }
}

/// How much of a single budget the user's total expenses consume, as a whole
/// percentage clamped to 0..=100.
///
/// A budget amount of zero or less reports zero progress rather than dividing
/// by zero.
pub fn budget_progress(budget_amount: f64, expense_total: f64) -> u8 {
    if !(budget_amount.is_finite() && budget_amount > 0.0) {
        return 0;
    }

    (expense_total / budget_amount * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Sum expenses per fixed category, in the fixed category order.
///
/// Categories with no expenses are retained with a zero sum. Transactions in
/// categories outside the fixed list are ignored.
pub fn category_totals(transactions: &[Transaction]) -> Vec<(&'static str, f64)> {
    CATEGORIES
        .iter()
        .map(|&category| {
            let total = transactions
                .iter()
                .filter(|transaction| {
                    is_expense(transaction) && transaction.category_name.as_ref() == category
                })
                .map(sanitized_amount)
                .sum();

            (category, total)
        })
        .collect()
}

/// A category's share of the grand total, as a percentage.
///
/// Returns zero when the grand total is zero.
pub fn category_share(total: f64, grand_total: f64) -> f64 {
    if grand_total == 0.0 {
        0.0
    } else {
        total / grand_total * 100.0
    }
}

/// The 3-letter label for a month.
fn month_label(month: time::Month) -> &'static str {
    match month {
        time::Month::January => "Jan",
        time::Month::February => "Feb",
        time::Month::March => "Mar",
        time::Month::April => "Apr",
        time::Month::May => "May",
        time::Month::June => "Jun",
        time::Month::July => "Jul",
        time::Month::August => "Aug",
        time::Month::September => "Sep",
        time::Month::October => "Oct",
        time::Month::November => "Nov",
        time::Month::December => "Dec",
    }
}

/// The 3-letter labels of the six calendar months ending with `today`'s
/// month, oldest first.
fn monthly_labels(today: Date) -> Vec<String> {
    (0..BUCKET_COUNT)
        .rev()
        .map(|months_back| {
            let mut month = today.month();
            for _ in 0..months_back {
                month = month.previous();
            }

            month_label(month).to_string()
        })
        .collect()
}

/// The start dates of the six week-long buckets ending with `today`'s week,
/// oldest first. Bucket `i` covers `[start, start + 6 days]` inclusive.
fn weekly_bucket_starts(today: Date) -> Vec<Date> {
    (0..BUCKET_COUNT)
        .map(|i| {
            let weeks_back = (BUCKET_COUNT - 1 - i) as i64;
            today.saturating_sub(Duration::weeks(weeks_back))
        })
        .collect()
}

/// The label for the week-long bucket starting on `start`.
///
/// The week number counts weeks within the start's calendar month, so the
/// numbering restarts at `Week 1` whenever the buckets cross into a new
/// month.
fn week_label(start: Date) -> String {
    let week_of_month = (u16::from(start.day()) + 6) / 7;
    format!("Week {week_of_month}")
}

/// Bucket expenses by category over the six most recent weeks or months.
///
/// Monthly buckets match transactions by month name alone, so a transaction
/// from the same month of a previous year lands in the current year's bucket.
/// Categories whose buckets are all zero are dropped from the series. Income
/// transactions are never counted.
pub fn spending_series(
    transactions: &[Transaction],
    bucket_kind: BucketKind,
    today: Date,
) -> SpendingSeries {
    let expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| is_expense(transaction))
        .collect();

    let (labels, week_starts) = match bucket_kind {
        BucketKind::Monthly => (monthly_labels(today), None),
        BucketKind::Weekly => {
            let starts = weekly_bucket_starts(today);
            let labels = starts.iter().map(|&start| week_label(start)).collect();

            (labels, Some(starts))
        }
    };

    let in_bucket = |transaction: &Transaction, bucket: usize| match &week_starts {
        None => month_label(transaction.date.month()) == labels[bucket],
        Some(starts) => {
            let start = starts[bucket];
            let end = start.saturating_add(Duration::days(6));

            transaction.date >= start && transaction.date <= end
        }
    };

    let series = CATEGORIES
        .iter()
        .filter_map(|&category| {
            let values: Vec<f64> = (0..BUCKET_COUNT)
                .map(|bucket| {
                    expenses
                        .iter()
                        .filter(|transaction| {
                            transaction.category_name.as_ref() == category
                                && in_bucket(transaction, bucket)
                        })
                        .map(|transaction| sanitized_amount(transaction))
                        .sum()
                })
                .collect();

            if values.iter().any(|&value| value > 0.0) {
                Some(CategorySeries {
                    name: category,
                    color: display_color(category),
                    values,
                })
            } else {
                None
            }
        })
        .collect();

    SpendingSeries { labels, series }
}

/// The fixed category with the highest expense total.
///
/// Ties resolve to the earlier entry in the fixed category list, which also
/// means the first category is reported when there are no expenses at all.
pub fn most_spent_category(transactions: &[Transaction]) -> &'static str {
    let totals = category_totals(transactions);

    let mut best = totals[0];
    for &(category, total) in &totals[1..] {
        if total > best.1 {
            best = (category, total);
        }
    }

    best.0
}

#[cfg(test)]
mod aggregation_tests {
    use time::{Date, macros::date};

    use crate::{
        UserID,
        budget::{Budget, BudgetPeriod},
        category::{CategoryColor, CategoryName},
        transaction::{Transaction, TransactionKind},
    };

    use super::{
        BucketKind, budget_progress, budget_rollup, category_share, category_totals,
        most_spent_category, spending_series, totals,
    };

    fn transaction(category: &str, amount: f64, kind: TransactionKind, date: Date) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            category_name: CategoryName::new_unchecked(category),
            category_color: CategoryColor::default(),
            amount,
            kind,
            description: String::new(),
            date,
        }
    }

    fn expense(category: &str, amount: f64, date: Date) -> Transaction {
        transaction(category, amount, TransactionKind::Expense, date)
    }

    fn income(amount: f64, date: Date) -> Transaction {
        transaction("Other", amount, TransactionKind::Income, date)
    }

    fn budget(amount: f64) -> Budget {
        Budget {
            id: 1,
            user_id: UserID::new(1),
            category_name: "Food".to_string(),
            period: BudgetPeriod::Monthly,
            amount,
            starting_date: date!(2025 - 06 - 01),
            description: String::new(),
        }
    }

    #[test]
    fn totals_of_empty_input_are_zero() {
        let result = totals(&[]);

        assert_eq!(result.income, 0.0);
        assert_eq!(result.expenses, 0.0);
        assert_eq!(result.balance, 0.0);
    }

    #[test]
    fn totals_balance_is_income_minus_expenses() {
        let transactions = vec![
            income(1000.0, date!(2025 - 06 - 01)),
            expense("Food", 300.0, date!(2025 - 06 - 02)),
            expense("Bills", 900.0, date!(2025 - 06 - 03)),
        ];

        let result = totals(&transactions);

        assert_eq!(result.income, 1000.0);
        assert_eq!(result.expenses, 1200.0);
        // Overspending drives the balance negative.
        assert_eq!(result.balance, -200.0);
    }

    #[test]
    fn totals_are_order_independent() {
        let mut transactions = vec![
            income(1000.0, date!(2025 - 06 - 01)),
            expense("Food", 300.0, date!(2025 - 06 - 02)),
            expense("Bills", 900.0, date!(2025 - 06 - 03)),
        ];

        let forward = totals(&transactions);
        transactions.reverse();
        let backward = totals(&transactions);

        assert_eq!(forward, backward);
    }

    #[test]
    fn totals_treat_non_finite_amounts_as_zero() {
        let transactions = vec![
            expense("Food", f64::NAN, date!(2025 - 06 - 01)),
            expense("Food", f64::INFINITY, date!(2025 - 06 - 02)),
            expense("Food", 25.0, date!(2025 - 06 - 03)),
        ];

        let result = totals(&transactions);

        assert_eq!(result.expenses, 25.0);
    }

    #[test]
    fn totals_do_not_mutate_input() {
        let transactions = vec![expense("Food", 10.0, date!(2025 - 06 - 01))];
        let snapshot = transactions.clone();

        totals(&transactions);

        assert_eq!(transactions, snapshot);
    }

    #[test]
    fn budget_rollup_remaining_goes_negative() {
        let budgets = vec![budget(500.0), budget(500.0)];

        let result = budget_rollup(&budgets, 1500.0);

        assert_eq!(result.planned, 1000.0);
        assert_eq!(result.spent, 1500.0);
        assert_eq!(result.remaining, -500.0);
    }

    #[test]
    fn budget_rollup_of_no_budgets_is_zero_planned() {
        let result = budget_rollup(&[], 200.0);

        assert_eq!(result.planned, 0.0);
        assert_eq!(result.remaining, -200.0);
    }

    #[test]
    fn budget_progress_clamps_to_100() {
        // 500 spent against a 200 budget is 250%, reported as 100%.
        assert_eq!(budget_progress(200.0, 500.0), 100);
    }

    #[test]
    fn budget_progress_rounds_to_whole_percent() {
        assert_eq!(budget_progress(300.0, 100.0), 33);
        assert_eq!(budget_progress(200.0, 101.0), 51);
    }

    #[test]
    fn budget_progress_is_zero_for_non_positive_amount() {
        assert_eq!(budget_progress(0.0, 500.0), 0);
        assert_eq!(budget_progress(-10.0, 500.0), 0);
    }

    #[test]
    fn category_totals_retain_zero_categories_in_order() {
        let transactions = vec![
            expense("Transport", 20.0, date!(2025 - 06 - 01)),
            expense("Bills", 80.0, date!(2025 - 06 - 02)),
        ];

        let result = category_totals(&transactions);

        assert_eq!(
            result,
            vec![
                ("Food", 0.0),
                ("Transport", 20.0),
                ("Entertainment", 0.0),
                ("Shopping", 0.0),
                ("Bills", 80.0),
                ("Other", 0.0),
            ]
        );
    }

    #[test]
    fn category_totals_exclude_income() {
        let transactions = vec![
            income(1000.0, date!(2025 - 06 - 01)),
            expense("Other", 50.0, date!(2025 - 06 - 02)),
        ];

        let result = category_totals(&transactions);

        assert_eq!(result[5], ("Other", 50.0));
    }

    #[test]
    fn category_share_of_zero_grand_total_is_zero() {
        assert_eq!(category_share(100.0, 0.0), 0.0);
    }

    #[test]
    fn category_share_is_a_percentage() {
        assert_eq!(category_share(25.0, 100.0), 25.0);
    }

    #[test]
    fn monthly_series_has_six_labels_ending_with_current_month() {
        let result = spending_series(&[], BucketKind::Monthly, date!(2025 - 06 - 15));

        assert_eq!(result.labels, ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        assert!(result.series.is_empty());
    }

    #[test]
    fn monthly_labels_wrap_across_the_year_boundary() {
        let result = spending_series(&[], BucketKind::Monthly, date!(2025 - 02 - 10));

        assert_eq!(result.labels, ["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
    }

    #[test]
    fn monthly_series_buckets_by_month_name_only() {
        // A transaction from June of a previous year still lands in this
        // year's June bucket because matching is by month name alone.
        let transactions = vec![
            expense("Food", 40.0, date!(2025 - 06 - 10)),
            expense("Food", 60.0, date!(2023 - 06 - 10)),
        ];

        let result = spending_series(&transactions, BucketKind::Monthly, date!(2025 - 06 - 15));

        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series[0].name, "Food");
        assert_eq!(result.series[0].values, [0.0, 0.0, 0.0, 0.0, 0.0, 100.0]);
    }

    #[test]
    fn monthly_series_drops_all_zero_categories() {
        let transactions = vec![
            expense("Food", 40.0, date!(2025 - 06 - 10)),
            expense("Bills", 90.0, date!(2025 - 05 - 10)),
        ];

        let result = spending_series(&transactions, BucketKind::Monthly, date!(2025 - 06 - 15));

        let names: Vec<&str> = result.series.iter().map(|series| series.name).collect();
        assert_eq!(names, ["Food", "Bills"]);
    }

    #[test]
    fn monthly_series_excludes_income() {
        let transactions = vec![income(1000.0, date!(2025 - 06 - 10))];

        let result = spending_series(&transactions, BucketKind::Monthly, date!(2025 - 06 - 15));

        assert!(result.series.is_empty());
    }

    #[test]
    fn series_carries_category_display_colors() {
        let transactions = vec![expense("Food", 40.0, date!(2025 - 06 - 10))];

        let result = spending_series(&transactions, BucketKind::Monthly, date!(2025 - 06 - 15));

        assert_eq!(result.series[0].color, "#10B981");
    }

    #[test]
    fn weekly_series_spans_inclusive_week_buckets() {
        // The newest bucket starts today, so only today's transaction and
        // one from the previous bucket's start are counted where expected.
        let transactions = vec![
            expense("Food", 10.0, date!(2025 - 06 - 15)),
            expense("Food", 20.0, date!(2025 - 06 - 08)),
            // Outside all buckets: more than 5 weeks before today.
            expense("Food", 99.0, date!(2025 - 05 - 01)),
        ];

        let result = spending_series(&transactions, BucketKind::Weekly, date!(2025 - 06 - 15));

        assert_eq!(result.series[0].values, [0.0, 0.0, 0.0, 0.0, 20.0, 10.0]);
    }

    #[test]
    fn weekly_labels_count_weeks_within_the_start_month() {
        // Buckets start on May 11, 18, 25, Jun 1, 8, 15. The numbering
        // restarts when the bucket start crosses into June.
        let result = spending_series(&[], BucketKind::Weekly, date!(2025 - 06 - 15));

        assert_eq!(
            result.labels,
            ["Week 2", "Week 3", "Week 4", "Week 1", "Week 2", "Week 3"]
        );
    }

    #[test]
    fn most_spent_category_picks_highest_total() {
        let transactions = vec![
            expense("Food", 40.0, date!(2025 - 06 - 01)),
            expense("Bills", 90.0, date!(2025 - 06 - 02)),
        ];

        assert_eq!(most_spent_category(&transactions), "Bills");
    }

    #[test]
    fn most_spent_category_breaks_ties_by_list_order() {
        let transactions = vec![
            expense("Shopping", 50.0, date!(2025 - 06 - 01)),
            expense("Transport", 50.0, date!(2025 - 06 - 02)),
        ];

        // Transport comes before Shopping in the fixed category list.
        assert_eq!(most_spent_category(&transactions), "Transport");
    }

    #[test]
    fn most_spent_category_of_no_expenses_is_first_category() {
        assert_eq!(most_spent_category(&[]), "Food");
        assert_eq!(
            most_spent_category(&[income(1000.0, date!(2025 - 06 - 01))]),
            "Food"
        );
    }
}
