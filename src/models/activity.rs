use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::FileRef;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub attachments: Json<Vec<FileRef>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Submissions are accepted up to and including the deadline instant.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}

/// Pin a deadline to 23:59:59.999 UTC of its UTC calendar date. Whatever
/// time-of-day or offset the client supplied is discarded.
pub fn normalize_deadline(raw: DateTime<Utc>) -> DateTime<Utc> {
    raw.date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is a valid time of day")
        .and_utc()
}

/// Accepts an RFC 3339 timestamp (any offset) or a bare `YYYY-MM-DD` date.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(normalize_deadline(dt.with_timezone(&Utc)));
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| normalize_deadline(dt.and_utc()))
}
