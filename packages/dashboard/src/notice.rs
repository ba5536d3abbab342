//! User-facing failure notices.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A failure message with the time it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    /// Human-readable description.
    pub message: String,
    /// When the failure happened.
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    /// Creates a notice stamped with the current time.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}
