//! Accounts that own transactions, and the database queries for them.
//!
//! An account's ID is the [OwnerId] that scopes every transaction query.

use std::fmt::Display;

use bcrypt::{hash, verify};
use rusqlite::{Connection, Row, ffi::SQLITE_CONSTRAINT_UNIQUE};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, OwnerId, ValidationError};

/// The minimum number of characters in a password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A normalized email address, e.g. "jane@example.com".
///
/// Addresses are trimmed and lowercased, so two spellings that differ only
/// by case belong to the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Create and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError::InvalidEmail] if `text` is not of the form
    /// `local@domain.tld` or contains whitespace.
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim().to_lowercase();

        let is_valid = match text.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    && !text.contains(char::is_whitespace)
            }
            None => false,
        };

        if is_valid {
            Ok(Self(text))
        } else {
            Err(ValidationError::InvalidEmail(text))
        }
    }

    /// Create an email address without validation.
    ///
    /// The caller should ensure that the address is valid and normalized.
    pub fn new_unchecked(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A password that has been validated, but not yet hashed.
///
/// This struct can be used to construct a [PasswordHash].
#[derive(Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Validate a raw password.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError::PasswordTooShort] if the password has
    /// fewer than [MIN_PASSWORD_LENGTH] characters.
    pub fn new(raw_password: &str) -> Result<Self, ValidationError> {
        if raw_password.chars().count() < MIN_PASSWORD_LENGTH {
            Err(ValidationError::PasswordTooShort)
        } else {
            Ok(Self(raw_password.to_owned()))
        }
    }
}

impl std::fmt::Debug for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ValidatedPassword(********)")
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed
    /// to verify a password. Pass in [PasswordHash::DEFAULT_COST] outside of
    /// tests.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the password could not be hashed,
    /// e.g. because `cost` is out of range.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Create a password hash from a string that is already a bcrypt hash.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check that `raw_password` matches the stored password.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A registered account.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The account's ID, which owns the account's transactions.
    pub id: OwnerId,
    /// The display name of the account holder.
    pub name: String,
    /// The address used to log in.
    pub email: Email,
    /// The hash of the account's password.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// When the account was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The fields for registering a [User].
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The display name, already trimmed and not empty.
    pub name: String,
    /// The address used to log in.
    pub email: Email,
    /// The hash of the chosen password.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(name) > 0),
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Register a new account, recording `now` as its creation time.
///
/// # Errors
///
/// Returns an:
/// - [Error::EmailInUse] if an account already uses the email address,
/// - or [Error::SqlError] if any other SQL error occurred.
pub fn create_user(
    new_user: NewUser,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .query_row(
            "INSERT INTO user (name, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, email, password_hash, created_at",
            (
                new_user.name.as_str(),
                new_user.email.as_ref(),
                new_user.password_hash.as_ref(),
                now,
            ),
            map_user_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::EmailInUse
            }
            error => error.into(),
        })
}

/// Get the account registered with `email`.
///
/// # Errors
///
/// Returns an:
/// - [Error::NotFound] if no account uses `email`,
/// - or [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "SELECT id, name, email, password_hash, created_at FROM user WHERE email = ?1",
            [email.as_ref()],
            map_user_row,
        )
        .map_err(Error::from)
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: OwnerId::new(row.get(0)?),
        name: row.get(1)?,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(4)?,
    })
}
