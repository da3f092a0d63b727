//! Defines the token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::OwnerId;

/// A token for authorization and authentication.
///
/// The token is only ever stored in a private cookie, so its contents are
/// encrypted and cannot be forged by the client.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    /// The owner the token was issued to.
    pub owner_id: OwnerId,

    /// When the token stops being accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the token is no longer valid at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
