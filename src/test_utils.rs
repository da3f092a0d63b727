#![allow(missing_docs)]

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
use axum_test::TestServer;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, macros::datetime};

use crate::{
    AppState, Error, OwnerId, build_router,
    auth::{COOKIE_TOKEN, set_auth_cookie},
    db::initialize,
    transaction::{Amount, Category, Description, NewTransaction, TransactionKind},
};

const TEST_LOG_IN_ROUTE: &str = "/test/log_in/{owner_id}";

/// The cheapest bcrypt cost, so that tests that register users stay fast.
const TEST_PASSWORD_COST: u32 = 4;

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    initialize(&connection).expect("could not initialize database");
    connection
}

/// A fixed point in time for deterministic timestamps.
pub(crate) fn test_now() -> OffsetDateTime {
    datetime!(2024-01-15 10:00:00 UTC)
}

#[track_caller]
pub(crate) fn new_transaction(
    amount: Decimal,
    kind: TransactionKind,
    category: &str,
    occurred_at: Date,
) -> NewTransaction {
    NewTransaction {
        amount: Amount::new(amount).expect("invalid test amount"),
        kind,
        category: Category::new(category).expect("invalid test category"),
        description: Description::new(&format!("{category} {kind}"))
            .expect("invalid test description"),
        occurred_at,
    }
}

async fn stub_log_in_route(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
    jar: PrivateCookieJar,
) -> Result<PrivateCookieJar, Error> {
    set_auth_cookie(jar, OwnerId::new(owner_id), state.cookie_duration)
}

/// Create a test server for the full router, plus a route that logs in any owner.
#[track_caller]
pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let state = AppState::new(
        Connection::open_in_memory().expect("could not open in-memory database"),
        "42",
    )
    .expect("could not create app state")
    .with_password_cost(TEST_PASSWORD_COST);

    let log_in_router = Router::new()
        .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
        .with_state(state.clone());
    let app = build_router(state.clone()).merge(log_in_router);

    let server = TestServer::try_new(app).expect("could not create test server");

    (server, state)
}

/// Log in as `owner_id` and return the auth cookie to attach to requests.
pub(crate) async fn log_in_as(server: &TestServer, owner_id: i64) -> Cookie<'static> {
    let response = server
        .post(&crate::endpoints::format_endpoint(TEST_LOG_IN_ROUTE, owner_id))
        .await;
    response.assert_status_ok();

    response.cookie(COOKIE_TOKEN)
}

/// Register a user through the API and return their auth cookie.
pub(crate) async fn register_as(
    server: &TestServer,
    email: &str,
    password: &str,
) -> Cookie<'static> {
    let response = server
        .post(crate::endpoints::REGISTER_API)
        .json(&serde_json::json!({
            "name": "Test User",
            "email": email,
            "password": password,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.cookie(COOKIE_TOKEN)
}
