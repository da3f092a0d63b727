use axum::{
    Extension, Json,
    extract::{Path, State},
};
use time::OffsetDateTime;

use crate::{
    Error, OwnerId,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{
        Transaction, TransactionUpdate, form::UpdateTransactionRequest, state::TransactionState,
        update_transaction,
    },
};

/// A route handler for updating some or all fields of a transaction.
///
/// Responds with the transaction as it is after the update.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, Error> {
    let update = TransactionUpdate::try_from(request)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = update_transaction(
        owner_id,
        transaction_id,
        update,
        OffsetDateTime::now_utc(),
        &connection,
    )
    .inspect_err(|error| {
        if matches!(error, Error::NotFound) {
            tracing::debug!("Owner {owner_id} tried to update missing transaction {transaction_id}");
        }
    })?;

    tracing::info!("Updated transaction {transaction_id} for owner {owner_id}");

    Ok(Json(transaction))
}
