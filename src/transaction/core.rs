//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error, OwnerId,
    database_id::TransactionId,
    transaction::{Amount, Category, Description, TransactionKind},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [NewTransaction] with [create_transaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The owner of the transaction.
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
    /// The amount of money spent or earned in this transaction.
    pub amount: Amount,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// What the money was earned or spent on, e.g. "Salary".
    pub category: Category,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(rename = "date")]
    pub occurred_at: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields for creating a [Transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// What the money was earned or spent on.
    pub category: Category,
    /// What the transaction was for.
    pub description: Description,
    /// The date of the economic event, which may differ from when it was recorded.
    pub occurred_at: Date,
}

/// A partial update to a [Transaction].
///
/// Fields that are `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// The new amount.
    pub amount: Option<Amount>,
    /// The new kind.
    pub kind: Option<TransactionKind>,
    /// The new category.
    pub category: Option<Category>,
    /// The new description.
    pub description: Option<Description>,
    /// The new transaction date.
    pub occurred_at: Option<Date>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, owner_id, amount, kind, category, description, occurred_at, created_at, updated_at";

/// Create a new transaction for `owner_id` in the database.
///
/// `now` is recorded as both the creation and last update time.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    owner_id: OwnerId,
    transaction: NewTransaction,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
            (owner_id, amount, kind, category, description, occurred_at, created_at, updated_at) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                owner_id.as_i64(),
                transaction.amount,
                transaction.kind,
                transaction.category.as_ref(),
                transaction.description.as_ref(),
                transaction.occurred_at,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction `id` belonging to `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `owner_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    owner_id: OwnerId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            WHERE id = :id AND owner_id = :owner_id"
        ))?
        .query_one(
            &[(":id", &id), (":owner_id", &owner_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Apply `update` to the transaction `id` belonging to `owner_id`.
///
/// Only the fields present in `update` are changed. The last update time is
/// set to `now` even if `update` contains no fields. The update is a single
/// statement, so readers never observe a partially updated transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `owner_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    owner_id: OwnerId,
    id: TransactionId,
    update: TransactionUpdate,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "UPDATE \"transaction\" \
            SET \
                amount = COALESCE(?1, amount), \
                kind = COALESCE(?2, kind), \
                category = COALESCE(?3, category), \
                description = COALESCE(?4, description), \
                occurred_at = COALESCE(?5, occurred_at), \
                updated_at = ?6 \
            WHERE id = ?7 AND owner_id = ?8 \
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                update.amount,
                update.kind,
                update.category.as_ref().map(AsRef::<str>::as_ref),
                update.description.as_ref().map(AsRef::<str>::as_ref),
                update.occurred_at,
                now,
                id,
                owner_id.as_i64(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Delete the transaction `id` belonging to `owner_id`.
///
/// Returns `true` if a transaction was deleted and `false` if there was no
/// such transaction. Deletion is permanent.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    owner_id: OwnerId,
    id: TransactionId,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND owner_id = :owner_id",
        &[(":id", &id), (":owner_id", &owner_id.as_i64())],
    )?;

    Ok(rows_affected > 0)
}

/// Get the number of transactions belonging to `owner_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(owner_id: OwnerId, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE owner_id = ?1",
            [owner_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                category TEXT NOT NULL CHECK (length(category) BETWEEN 1 AND 100),
                description TEXT NOT NULL CHECK (length(description) > 0),
                occurred_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    // Every query is scoped to an owner and most filter or sort by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_date \
        ON \"transaction\"(owner_id, occurred_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in the order of [TRANSACTION_COLUMNS].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let owner_id = OwnerId::new(row.get(1)?);
    let amount = row.get(2)?;
    let kind = row.get(3)?;
    let raw_category: String = row.get(4)?;
    let description = row.get(5)?;
    let occurred_at = row.get(6)?;
    let created_at = row.get(7)?;
    let updated_at = row.get(8)?;

    Ok(Transaction {
        id,
        owner_id,
        amount,
        kind,
        category: Category::new_unchecked(&raw_category),
        description,
        occurred_at,
        created_at,
        updated_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
