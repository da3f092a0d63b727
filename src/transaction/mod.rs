//! The Record Store: transactions and the endpoints for managing them.
//!
//! This module contains everything related to transactions:
//! - The validated field types and the `Transaction` model
//! - Database functions for storing, querying, and managing transactions
//! - The JSON route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod form;
mod get_endpoint;
mod list_endpoint;
mod query;
mod state;

pub use core::{
    NewTransaction, Transaction, TransactionUpdate, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use domain::{Amount, Category, Description, TransactionKind};
pub use edit_endpoint::edit_transaction_endpoint;
pub(crate) use form::parse_optional_date;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{TransactionFilter, list_transactions};
