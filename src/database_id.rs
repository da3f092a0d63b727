//! Database ID type definitions.

/// Alias for the integer type used for transaction IDs.
///
/// IDs are assigned by the database and are never reused, even after the
/// transaction they identified has been deleted.
pub type TransactionId = i64;
