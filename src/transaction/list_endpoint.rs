use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{
    Error, OwnerId,
    db::lock_connection,
    transaction::{
        Transaction, TransactionFilter, form::ListTransactionsQuery, list_transactions,
        state::TransactionState,
    },
};

/// A route handler for listing the owner's transactions, newest first.
///
/// The query parameters `type`, `category`, `startDate` and `endDate`
/// narrow down the result.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = TransactionFilter::try_from(query)?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(owner_id, &filter, &connection)?;

    tracing::debug!(
        "Listed {} transactions for owner {owner_id} with {filter:?}",
        transactions.len()
    );

    Ok(Json(transactions))
}
