use axum::{Extension, Json, extract::State, http::StatusCode};
use time::OffsetDateTime;

use crate::{
    Error, OwnerId,
    db::lock_connection,
    transaction::{
        NewTransaction, Transaction, create_transaction, form::CreateTransactionRequest,
        state::TransactionState,
    },
};

/// A route handler for creating a new transaction.
///
/// Responds with `201 Created` and the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = NewTransaction::try_from(request)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(
        owner_id,
        new_transaction,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    tracing::info!("Created transaction {} for owner {owner_id}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        OwnerId, endpoints,
        test_utils::{get_test_server, log_in_as},
        transaction::{Transaction, count_transactions},
    };

    #[tokio::test]
    async fn can_create_transaction() {
        let (server, state) = get_test_server();
        let cookie = log_in_as(&server, 1).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "amount": 100,
                "type": "income",
                "category": "Salary",
                "description": "Monthly salary",
                "date": "2024-01-15",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["id"], 1);
        assert_eq!(body["userId"], 1);
        assert_eq!(body["amount"], "100.00");
        assert_eq!(body["type"], "income");
        assert_eq!(body["category"], "Salary");
        assert_eq!(body["description"], "Monthly salary");
        assert_eq!(body["date"], "2024-01-15");
        assert_eq!(body["createdAt"], body["updatedAt"]);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(OwnerId::new(1), &connection), Ok(1));
    }

    #[tokio::test]
    async fn trims_category_and_description() {
        let (server, _) = get_test_server();
        let cookie = log_in_as(&server, 1).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "amount": "12.5",
                "type": "expense",
                "category": "  Food ",
                "description": " Lunch  ",
                "date": "2024-01-16T12:30:00Z",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction: Transaction = response.json();
        assert_eq!(transaction.category.as_ref(), "Food");
        assert_eq!(transaction.description, "Lunch");
        assert_eq!(transaction.amount.to_string(), "12.50");
        assert_eq!(transaction.occurred_at.to_string(), "2024-01-16");
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let (server, state) = get_test_server();
        let cookie = log_in_as(&server, 1).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "amount": -100,
                "type": "income",
                "category": "Salary",
                "description": "Monthly salary",
                "date": "2024-01-15",
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["field"], "amount");

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(OwnerId::new(1), &connection), Ok(0));
    }

    #[tokio::test]
    async fn rejects_sub_cent_amount_as_too_precise() {
        let (server, _) = get_test_server();
        let cookie = log_in_as(&server, 1).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "amount": "0.000000000000000000000000000001",
                "type": "income",
                "category": "Salary",
                "description": "Monthly salary",
                "date": "2024-01-15",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({
            "error": "amount must not have more than two decimal places",
            "field": "amount",
        }));
    }

    #[tokio::test]
    async fn rejects_unknown_type() {
        let (server, _) = get_test_server();
        let cookie = log_in_as(&server, 1).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "amount": 100,
                "type": "transfer",
                "category": "Salary",
                "description": "Monthly salary",
                "date": "2024-01-15",
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["field"], "type");
    }

    #[tokio::test]
    async fn rejects_malformed_date() {
        let (server, _) = get_test_server();
        let cookie = log_in_as(&server, 1).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "amount": 100,
                "type": "income",
                "category": "Salary",
                "description": "Monthly salary",
                "date": "not a date",
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["field"], "date");
    }

    #[tokio::test]
    async fn rejects_client_supplied_owner() {
        let (server, _) = get_test_server();
        let cookie = log_in_as(&server, 1).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "amount": 100,
                "type": "income",
                "category": "Salary",
                "description": "Monthly salary",
                "date": "2024-01-15",
                "userId": 2,
            }))
            .await;

        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn requires_log_in() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({
                "amount": 100,
                "type": "income",
                "category": "Salary",
                "description": "Monthly salary",
                "date": "2024-01-15",
            }))
            .await;

        response.assert_status_unauthorized();
    }
}
