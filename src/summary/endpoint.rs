use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, OwnerId,
    db::lock_connection,
    summary::{Summary, summarize},
    transaction::{TransactionFilter, parse_optional_date},
};

/// The state needed to summarise transactions.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string for the summary endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

/// A [Summary] as sent to clients.
///
/// Amounts are rounded to cents here and nowhere else. Category keys are
/// rendered as "{type}-{category}", e.g. "income-Salary".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    total_income: Decimal,
    total_expenses: Decimal,
    balance: Decimal,
    by_category: BTreeMap<String, Decimal>,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            total_income: to_cents(summary.total_income),
            total_expenses: to_cents(summary.total_expenses),
            balance: to_cents(summary.balance()),
            by_category: summary
                .by_category
                .into_iter()
                .map(|(key, amount)| (key.to_string(), to_cents(amount)))
                .collect(),
        }
    }
}

fn to_cents(mut amount: Decimal) -> Decimal {
    amount.rescale(2);
    amount
}

/// A route handler for summarising the owner's transactions.
///
/// The query parameters `startDate` and `endDate` restrict the summary to an
/// inclusive date range.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, Error> {
    let filter = TransactionFilter {
        start_date: parse_optional_date("startDate", query.start_date.as_deref())?,
        end_date: parse_optional_date("endDate", query.end_date.as_deref())?,
        ..Default::default()
    };

    let connection = lock_connection(&state.db_connection)?;
    let summary = summarize(owner_id, &filter, &connection)?;

    Ok(Json(summary.into()))
}
