use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, OwnerId,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{Transaction, get_transaction, state::TransactionState},
};

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(owner_id, transaction_id, &connection).map(Json)
}
