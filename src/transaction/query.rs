//! Filtered queries over an owner's transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error, OwnerId,
    transaction::{Category, Transaction, TransactionKind, core::map_transaction_row},
};

/// Optional constraints for listing transactions.
///
/// Constraints that are `None` do not restrict the result. The date bounds
/// are inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Only include transactions with exactly this category.
    pub category: Option<Category>,
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
}

impl TransactionFilter {
    /// A copy of the filter that keeps the date bounds and drops everything else.
    pub fn dates_only(&self) -> Self {
        Self {
            kind: None,
            category: None,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Get the transactions belonging to `owner_id` that match `filter`.
///
/// Transactions are sorted by date, most recent first. Transactions on the
/// same date are sorted by ID, most recent first, so the order is stable
/// across identical reads.
///
/// A filter whose start date is after its end date matches nothing.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    owner_id: OwnerId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut where_clauses = vec!["owner_id = ?".to_owned()];
    let mut params: Vec<Value> = vec![Value::Integer(owner_id.as_i64())];

    if let Some(kind) = filter.kind {
        where_clauses.push("kind = ?".to_owned());
        params.push(Value::Text(kind.as_str().to_owned()));
    }

    if let Some(category) = &filter.category {
        where_clauses.push("category = ?".to_owned());
        params.push(Value::Text(category.as_ref().to_owned()));
    }

    if let Some(start_date) = filter.start_date {
        where_clauses.push("occurred_at >= ?".to_owned());
        params.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        where_clauses.push("occurred_at <= ?".to_owned());
        params.push(Value::Text(end_date.to_string()));
    }

    let query = format!(
        "SELECT id, owner_id, amount, kind, category, description, occurred_at, created_at, updated_at \
        FROM \"transaction\" \
        WHERE {} \
        ORDER BY occurred_at DESC, id DESC",
        where_clauses.join(" AND ")
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        OwnerId,
        test_utils::{get_test_connection, new_transaction, test_now},
        transaction::{
            Category, TransactionFilter, TransactionKind, create_transaction, list_transactions,
        },
    };

    const OWNER: OwnerId = OwnerId::new(1);

    fn seed(conn: &rusqlite::Connection) {
        let transactions = [
            (dec!(1000), TransactionKind::Income, "Salary", date!(2024 - 01 - 15)),
            (dec!(500), TransactionKind::Income, "Freelance", date!(2024 - 01 - 15)),
            (dec!(200), TransactionKind::Expense, "Food", date!(2024 - 01 - 16)),
            (dec!(50), TransactionKind::Expense, "Food", date!(2024 - 01 - 10)),
        ];

        for (amount, kind, category, date) in transactions {
            create_transaction(OWNER, new_transaction(amount, kind, category, date), test_now(), conn)
                .expect("could not create transaction");
        }

        create_transaction(
            OwnerId::new(2),
            new_transaction(dec!(9999), TransactionKind::Expense, "Food", date!(2024 - 01 - 15)),
            test_now(),
            conn,
        )
        .expect("could not create transaction");
    }

    fn ids(filter: &TransactionFilter, conn: &rusqlite::Connection) -> Vec<i64> {
        list_transactions(OWNER, filter, conn)
            .expect("could not list transactions")
            .into_iter()
            .map(|transaction| transaction.id)
            .collect()
    }

    #[test]
    fn lists_newest_first_with_ties_broken_by_id() {
        let conn = get_test_connection();
        seed(&conn);

        let got = ids(&TransactionFilter::default(), &conn);

        assert_eq!(got, vec![3, 2, 1, 4]);
    }

    #[test]
    fn never_includes_other_owners_transactions() {
        let conn = get_test_connection();
        seed(&conn);

        let got = list_transactions(OWNER, &TransactionFilter::default(), &conn).unwrap();

        assert!(got.iter().all(|transaction| transaction.owner_id == OWNER));
    }

    #[test]
    fn filters_by_kind() {
        let conn = get_test_connection();
        seed(&conn);

        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        };

        assert_eq!(ids(&filter, &conn), vec![3, 4]);
    }

    #[test]
    fn filters_by_category() {
        let conn = get_test_connection();
        seed(&conn);

        let filter = TransactionFilter {
            category: Some(Category::new("Salary").unwrap()),
            ..Default::default()
        };

        assert_eq!(ids(&filter, &conn), vec![1]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let conn = get_test_connection();
        seed(&conn);

        let filter = TransactionFilter {
            start_date: Some(date!(2024 - 01 - 15)),
            end_date: Some(date!(2024 - 01 - 16)),
            ..Default::default()
        };

        assert_eq!(ids(&filter, &conn), vec![3, 2, 1]);
    }

    #[test]
    fn start_after_end_matches_nothing() {
        let conn = get_test_connection();
        seed(&conn);

        let filter = TransactionFilter {
            start_date: Some(date!(2024 - 01 - 20)),
            end_date: Some(date!(2024 - 01 - 01)),
            ..Default::default()
        };

        assert!(ids(&filter, &conn).is_empty());
    }

    #[test]
    fn combines_constraints() {
        let conn = get_test_connection();
        seed(&conn);

        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            category: Some(Category::new("Food").unwrap()),
            start_date: Some(date!(2024 - 01 - 11)),
            end_date: None,
        };

        assert_eq!(ids(&filter, &conn), vec![3]);
    }

    #[test]
    fn repeated_reads_are_identical() {
        let conn = get_test_connection();
        seed(&conn);
        let filter = TransactionFilter::default();

        let first = list_transactions(OWNER, &filter, &conn).unwrap();
        let second = list_transactions(OWNER, &filter, &conn).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn dates_only_drops_kind_and_category() {
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Income),
            category: Some(Category::new("Salary").unwrap()),
            start_date: Some(date!(2024 - 01 - 01)),
            end_date: Some(date!(2024 - 01 - 31)),
        };

        let got = filter.dates_only();

        assert_eq!(
            got,
            TransactionFilter {
                kind: None,
                category: None,
                start_date: Some(date!(2024 - 01 - 01)),
                end_date: Some(date!(2024 - 01 - 31)),
            }
        );
    }
}
