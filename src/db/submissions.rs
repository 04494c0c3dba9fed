use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{FileRef, LearnerSubmissionRow, ReviewStatus, Submission, SubmissionDetailRow};

/// Create-or-overwrite in one statement. The unique index on
/// (activity_id, learner_id) makes concurrent submissions for the same pair
/// converge on a single row; the conflict arm replaces the evidence, stamps
/// the submission time, and resets the review state and comment.
pub async fn upsert_evidence(
    pool: &PgPool,
    activity_id: Uuid,
    learner_id: Uuid,
    evidence: &FileRef,
    submitted_at: DateTime<Utc>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "INSERT INTO submissions (activity_id, learner_id, evidence, submitted_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (activity_id, learner_id) DO UPDATE
         SET evidence = EXCLUDED.evidence,
             submitted_at = EXCLUDED.submitted_at,
             status = 'pending',
             comment = '',
             updated_at = now()
         RETURNING *",
    )
    .bind(activity_id)
    .bind(learner_id)
    .bind(Json(evidence))
    .bind(submitted_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All of one learner's submissions, newest-submitted-first, each carrying
/// the activity name. The inner join drops rows whose activity was deleted.
pub async fn list_for_learner(
    pool: &PgPool,
    learner_id: Uuid,
) -> Result<Vec<LearnerSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, LearnerSubmissionRow>(
        "SELECT s.id, s.activity_id, a.name AS activity_name, s.submitted_at,
                s.evidence, s.status, s.comment
         FROM submissions s
         JOIN activities a ON s.activity_id = a.id
         WHERE s.learner_id = $1
         ORDER BY s.submitted_at DESC",
    )
    .bind(learner_id)
    .fetch_all(pool)
    .await
}

/// Review-panel listing, optionally filtered to one activity.
pub async fn list_with_details(
    pool: &PgPool,
    activity_id: Option<Uuid>,
) -> Result<Vec<SubmissionDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionDetailRow>(
        "SELECT s.id, s.activity_id, a.name AS activity_name,
                s.learner_id, acc.first_name AS learner_first_name,
                acc.last_name AS learner_last_name, acc.email AS learner_email,
                s.submitted_at, s.evidence, s.status, s.comment
         FROM submissions s
         JOIN activities a ON s.activity_id = a.id
         JOIN accounts acc ON s.learner_id = acc.id
         WHERE $1::uuid IS NULL OR s.activity_id = $1
         ORDER BY s.submitted_at DESC",
    )
    .bind(activity_id)
    .fetch_all(pool)
    .await
}

/// Applies a review decision. Re-reviewing an already-decided submission is
/// allowed and overwrites the previous decision and comment.
pub async fn review(
    pool: &PgPool,
    id: Uuid,
    decision: ReviewStatus,
    comment: &str,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "UPDATE submissions
         SET status = $2, comment = $3, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(decision)
    .bind(comment)
    .fetch_one(pool)
    .await
}
