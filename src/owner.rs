//! The owner of a set of transactions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A newtype wrapper for integer owner IDs.
///
/// The owner is the authenticated principal that every transaction belongs to.
/// An owner ID is the ID of a registered user and is treated as an opaque,
/// trusted value once the auth cookie has been checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Create a new owner ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the owner ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
