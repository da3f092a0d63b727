//! Fintrack is a personal finance tracker.
//!
//! This library provides a JSON REST API for recording income and expense
//! transactions and for summarising them by type and category.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod owner;
mod routing;
mod summary;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{DEFAULT_COOKIE_DURATION, auth_guard, set_auth_cookie};
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use owner::OwnerId;
pub use routing::build_router;
pub use summary::{CategoryKey, Summary, aggregate, summarize};
pub use transaction::{
    Amount, Category, Description, NewTransaction, Transaction, TransactionFilter,
    TransactionKind, TransactionUpdate, count_transactions, create_transaction,
    delete_transaction, get_transaction, list_transactions, update_transaction,
};
pub use user::{Email, NewUser, PasswordHash, User, ValidatedPassword, create_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// A request field that failed validation.
///
/// These errors are always caused by the client and are fixed by correcting
/// the offending field, so they are never retried.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    /// The amount was zero or negative. The direction of a transaction is
    /// given by its type, so amounts are always positive.
    #[error("amount must be a positive number")]
    NonPositiveAmount,

    /// The amount had more precision than whole cents.
    #[error("amount must not have more than two decimal places")]
    TooManyDecimalPlaces,

    /// The amount does not fit in the amount column.
    #[error("amount must not exceed 99999999.99")]
    AmountTooLarge,

    /// The amount was not a number.
    #[error("amount \"{0}\" is not a valid number")]
    InvalidAmount(String),

    /// The transaction type was not "income" or "expense".
    #[error("type must be either income or expense, got \"{0}\"")]
    InvalidKind(String),

    /// The category was empty or only whitespace.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// The category was longer than 100 characters.
    #[error("category must not exceed 100 characters")]
    CategoryTooLong,

    /// The description was empty or only whitespace.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// The name of an account was empty or only whitespace.
    #[error("name cannot be empty")]
    EmptyName,

    /// The email address of an account was not of the form `local@domain`.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The password was shorter than eight characters.
    #[error("password must be at least 8 characters long")]
    PasswordTooShort,

    /// A date could not be parsed as an ISO 8601 date.
    #[error("{field} \"{value}\" is not a valid ISO 8601 date")]
    InvalidDate {
        /// The name of the request field that held the date.
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },
}

impl ValidationError {
    /// The name of the request field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NonPositiveAmount
            | ValidationError::TooManyDecimalPlaces
            | ValidationError::AmountTooLarge
            | ValidationError::InvalidAmount(_) => "amount",
            ValidationError::InvalidKind(_) => "type",
            ValidationError::EmptyCategory | ValidationError::CategoryTooLong => "category",
            ValidationError::EmptyDescription => "description",
            ValidationError::EmptyName => "name",
            ValidationError::InvalidEmail(_) => "email",
            ValidationError::PasswordTooShort => "password",
            ValidationError::InvalidDate { field, .. } => *field,
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent a field that violates a transaction constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested resource was not found.
    ///
    /// Transactions that belong to another owner are reported as not found
    /// so that clients cannot discover the existence of other owners' data.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The request did not carry a valid, unexpired auth token.
    #[error("missing or invalid auth token")]
    Unauthorized,

    /// The email and password did not match a registered account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// An account is already registered with the email address.
    #[error("the email address is already in use")]
    EmailInUse,

    /// The password could not be hashed or checked against a hash.
    #[error("could not hash password: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    ///
    /// This covers the database being unreachable as well as constraint
    /// violations raised by the storage layer.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": error.to_string(),
                    "field": error.field(),
                })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Transaction not found" })),
            )
                .into_response(),
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response(),
            Error::EmailInUse => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Email already in use" })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "An unexpected error occurred, check the server logs for more details."
                    })),
                )
                    .into_response()
            }
        }
    }
}
