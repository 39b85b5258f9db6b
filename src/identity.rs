//! Identity generator collaborator: opaque unique ids and "now".

use chrono::{DateTime, Local, NaiveDate, Utc};
use uuid::Uuid;

/// Globally-unique opaque identifier for new entities and stored labels.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Submission timestamp instant.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's calendar date in the kitchen's local time, used to seed fresh
/// drafts.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
