//! The route handler for registering a new user.

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error, ValidationError,
    auth::{
        log_in::{AccountResponse, AccountState},
        set_auth_cookie,
    },
    db::lock_connection,
    user::{Email, NewUser, PasswordHash, ValidatedPassword, create_user},
};

/// The JSON body of a registration request.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(self) -> Result<(String, Email, ValidatedPassword), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        Ok((
            name.to_owned(),
            Email::new(&self.email)?,
            ValidatedPassword::new(&self.password)?,
        ))
    }
}

/// A route handler for registering a user.
///
/// On success the user is logged in and returned with `201 Created`.
///
/// # Errors
///
/// Returns an:
/// - [Error::Validation] if the name, email or password is invalid,
/// - [Error::EmailInUse] if the email address is already registered,
/// - or [Error::HashingError] if the password could not be hashed.
pub async fn post_register(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, PrivateCookieJar, Json<AccountResponse>), Error> {
    let (name, email, password) = request.validate()?;
    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let user = create_user(
        NewUser {
            name,
            email,
            password_hash,
        },
        OffsetDateTime::now_utc(),
        &*lock_connection(&state.db_connection)?,
    )
    .inspect_err(|error| {
        if *error == Error::EmailInUse {
            tracing::debug!("Registration rejected, email already in use");
        }
    })?;

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;
    tracing::info!("Registered owner {}", user.id);

    Ok((StatusCode::CREATED, jar, Json(AccountResponse { user })))
}
