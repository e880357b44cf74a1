//! Type-safe messaging platform user identifier.
//!
//! [`UserId`] wraps the opaque string the messaging platform assigns to a
//! user, so it cannot be confused with display names or prompt text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a requester on the messaging platform.
///
/// Used both as the push-message addressee and as part of the
/// [`super::GenerationRecord`] key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
