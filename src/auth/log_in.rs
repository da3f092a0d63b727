//! The route handler for logging in with an email and password.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::set_auth_cookie,
    db::lock_connection,
    user::{Email, User, get_user_by_email},
};

/// The state needed to register users and log them in.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AccountState> for Key {
    fn from_ref(state: &AccountState) -> Self {
        state.cookie_key.clone()
    }
}

/// The JSON body of a log-in request.
///
/// The password is compared against the stored hash, so it is not validated.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

/// The JSON body returned after registering or logging in.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub user: User,
}

/// A route handler for logging in.
///
/// On success the auth cookie is set and the user is returned.
///
/// # Errors
///
/// Returns an [Error::InvalidCredentials] if the email is not registered or
/// the password is wrong. The two cases are indistinguishable to the client.
pub async fn post_log_in(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Json(request): Json<LogInRequest>,
) -> Result<(PrivateCookieJar, Json<AccountResponse>), Error> {
    // A malformed address cannot belong to an account.
    let email = Email::new(&request.email).map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_email(&email, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => {
            tracing::debug!("Log-in attempt for unregistered email {email}");
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error),
    };

    if !user.password_hash.verify(&request.password)? {
        tracing::debug!("Incorrect password for owner {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;
    tracing::info!("Owner {} logged in", user.id);

    Ok((jar, Json(AccountResponse { user })))
}
