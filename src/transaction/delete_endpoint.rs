use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, OwnerId,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{delete_transaction, state::TransactionState},
};

/// A route handler for deleting a transaction.
///
/// Responds with `204 No Content` on success and `404 Not Found` if the
/// owner has no such transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    if delete_transaction(owner_id, transaction_id, &connection)? {
        tracing::info!("Deleted transaction {transaction_id} for owner {owner_id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound)
    }
}
