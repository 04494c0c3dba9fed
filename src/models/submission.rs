use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::FileRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "review_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    /// Parses a review decision. Only the two decided states are valid input;
    /// `pending` is never a decision, it is what resubmission resets to.
    pub fn parse_decision(raw: &str) -> Option<Self> {
        match raw {
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// One learner's live evidence against one activity. There is at most one row
/// per (activity, learner) pair; resubmission overwrites in place.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub learner_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub evidence: Json<FileRef>,
    pub status: ReviewStatus,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Learner-facing listing row: the submission plus the activity name only.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct LearnerSubmissionRow {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub activity_name: String,
    pub submitted_at: DateTime<Utc>,
    pub evidence: Json<FileRef>,
    pub status: ReviewStatus,
    pub comment: String,
}

/// Review-panel row: the submission joined with the learner's name and
/// contact address and the activity name.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubmissionDetailRow {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub activity_name: String,
    pub learner_id: Uuid,
    pub learner_first_name: String,
    pub learner_last_name: String,
    pub learner_email: String,
    pub submitted_at: DateTime<Utc>,
    pub evidence: Json<FileRef>,
    pub status: ReviewStatus,
    pub comment: String,
}
