use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::email::templates;
use crate::error::AppError;
use crate::identity::IdentitySources;
use crate::models::{LearnerSubmissionRow, ReviewStatus, Submission, SubmissionDetailRow};
use crate::state::SharedState;
use crate::upload;

const EVIDENCE_SUBDIR: &str = "submissions";

#[derive(Deserialize)]
pub struct LearnerParams {
    pub learner_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub activity_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub decision: String,
    pub comment: Option<String>,
}

/// Evidence intake. Gates run in a fixed order (identity, account status,
/// activity existence, deadline, evidence presence) and the deadline gate
/// sits before any write, so a late request never touches stored evidence.
pub async fn submit(
    auth: Option<AuthUser>,
    State(state): State<SharedState>,
    Path(activity_id): Path<Uuid>,
    Query(params): Query<LearnerParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let mut form = upload::parse_form(&headers, body)
        .await
        .map_err(AppError::Validation)?;

    let body_learner = match form.text("learner_id") {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| AppError::Validation(format!("Invalid learner id: {raw}")))?,
        ),
        None => None,
    };

    let sources = IdentitySources {
        body: body_learner,
        query: params.learner_id,
        session: auth.map(|a| a.account_id),
    };
    let learner_id = sources
        .resolve()
        .ok_or_else(|| AppError::Forbidden("Missing learner identity".to_string()))?;

    let account = db::accounts::find_by_id(&state.pool, learner_id).await?;
    if !account.is_some_and(|a| a.is_active()) {
        return Err(AppError::Forbidden(
            "Your account is inactive. You cannot submit evidence.".to_string(),
        ));
    }

    let activity = db::activities::find_by_id(&state.pool, activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;

    let now = Utc::now();
    if activity.is_past_deadline(now) {
        return Err(AppError::DeadlinePassed(activity.deadline));
    }

    let file = form
        .take_file("evidence")
        .ok_or_else(|| AppError::Validation("An evidence file is required".to_string()))?;

    let evidence = upload::store_file(&state.config.upload_dir, EVIDENCE_SUBDIR, &file)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store evidence: {e}")))?;

    let submission =
        db::submissions::upsert_evidence(&state.pool, activity_id, learner_id, &evidence, now)
            .await?;

    // Same shape whether this created or overwrote: resubmission is
    // indistinguishable from first submission for the learner.
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Evidence received, pending review",
            "submission": submission,
        })),
    ))
}

/// A learner's own submissions, joined with activity names. Rows whose
/// activity has been deleted are filtered out by the query.
pub async fn list_mine(
    auth: Option<AuthUser>,
    State(state): State<SharedState>,
    Query(params): Query<LearnerParams>,
) -> Result<Json<Vec<LearnerSubmissionRow>>, AppError> {
    let sources = IdentitySources {
        body: None,
        query: params.learner_id,
        session: auth.map(|a| a.account_id),
    };
    let learner_id = sources
        .resolve()
        .ok_or_else(|| AppError::Forbidden("Missing learner identity".to_string()))?;

    let rows = db::submissions::list_for_learner(&state.pool, learner_id).await?;
    Ok(Json(rows))
}

pub async fn list_all(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubmissionDetailRow>>, AppError> {
    auth.require_admin()?;

    let rows = db::submissions::list_with_details(&state.pool, params.activity_id).await?;
    Ok(Json(rows))
}

pub async fn review(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let decision = ReviewStatus::parse_decision(&req.decision).ok_or_else(|| {
        AppError::Validation(format!(
            "Decision must be 'approved' or 'rejected', got '{}'",
            req.decision
        ))
    })?;
    let comment = req.comment.unwrap_or_default();

    let submission = db::submissions::review(&state.pool, id, decision, &comment)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Submission not found".to_string()),
            _ => AppError::Database(e),
        })?;

    notify_learner(&state, &submission, decision).await;

    Ok(Json(serde_json::json!({
        "message": format!("Submission marked as {decision}"),
        "submission": submission,
    })))
}

/// Queue the review-outcome notice. The review is already durable; nothing
/// here can fail it.
async fn notify_learner(state: &SharedState, submission: &Submission, decision: ReviewStatus) {
    let account = match db::accounts::find_by_id(&state.pool, submission.learner_id).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::warn!(
                "Learner {} not found; skipping review notice",
                submission.learner_id
            );
            return;
        }
        Err(e) => {
            tracing::error!("Failed to load learner for review notice: {e}");
            return;
        }
    };

    let activity = match db::activities::find_by_id(&state.pool, submission.activity_id).await {
        Ok(Some(activity)) => activity,
        Ok(None) => {
            tracing::warn!(
                "Activity {} no longer exists; skipping review notice",
                submission.activity_id
            );
            return;
        }
        Err(e) => {
            tracing::error!("Failed to load activity for review notice: {e}");
            return;
        }
    };

    let subject = templates::review_subject(&activity.name, decision);
    let body = templates::render_review_notice(&activity.name, decision, &submission.comment);

    if let Err(e) = db::notifications::enqueue(&state.pool, &account.email, &subject, &body).await {
        tracing::error!("Failed to queue review notice for {}: {e}", account.email);
    }
}
