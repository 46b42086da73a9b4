//! Timestamps.

use chrono::{DateTime, Utc};

/// UTC instant at which an alert was raised.
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
