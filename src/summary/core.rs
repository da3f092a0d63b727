//! Aggregates transactions into income and expense totals.

use std::{collections::BTreeMap, fmt::Display};

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error, OwnerId,
    transaction::{Category, Transaction, TransactionFilter, TransactionKind, list_transactions},
};

/// Identifies one kind and category pair in a [Summary].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryKey {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// What the money was earned or spent on.
    pub category: Category,
}

impl CategoryKey {
    /// Create a key for `kind` and `category`.
    pub fn new(kind: TransactionKind, category: Category) -> Self {
        Self { kind, category }
    }
}

impl Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.kind, self.category)
    }
}

/// Income and expense totals over a set of transactions.
///
/// The totals and category sums are exact; no rounding happens until the
/// summary is presented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: Decimal,
    /// The sum of all expense amounts.
    pub total_expenses: Decimal,
    /// The sum of the amounts for each kind and category pair.
    pub by_category: BTreeMap<CategoryKey, Decimal>,
}

impl Summary {
    /// Income minus expenses. Negative when more was spent than earned.
    pub fn balance(&self) -> Decimal {
        self.total_income - self.total_expenses
    }
}

/// Sum `transactions` by kind and by kind and category in a single pass.
///
/// An empty slice gives zero totals and an empty category map.
pub fn aggregate(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for transaction in transactions {
        let amount = transaction.amount.value();

        match transaction.kind {
            TransactionKind::Income => summary.total_income += amount,
            TransactionKind::Expense => summary.total_expenses += amount,
        }

        *summary
            .by_category
            .entry(CategoryKey::new(transaction.kind, transaction.category.clone()))
            .or_insert(Decimal::ZERO) += amount;
    }

    summary
}

/// Summarise the transactions of `owner_id` within the date bounds of `filter`.
///
/// Only the date bounds of `filter` are used, the kind and category
/// constraints are ignored so that the summary always covers both kinds.
///
/// # Errors
/// Returns an [Error::SqlError] if the transactions cannot be read.
pub fn summarize(
    owner_id: OwnerId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Summary, Error> {
    let transactions = list_transactions(owner_id, &filter.dates_only(), connection)?;

    Ok(aggregate(&transactions))
}
