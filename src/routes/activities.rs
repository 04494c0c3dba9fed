use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::email::templates;
use crate::error::AppError;
use crate::models::activity::parse_deadline;
use crate::models::{Activity, FileRef, SubmissionDetailRow};
use crate::state::SharedState;
use crate::upload;

const ATTACHMENT_SUBDIR: &str = "activities";

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let mut form = upload::parse_form(&headers, body)
        .await
        .map_err(AppError::Validation)?;

    let name = form
        .text("name")
        .ok_or_else(|| AppError::Validation("Activity name is required".to_string()))?
        .to_string();
    let description = form
        .text("description")
        .ok_or_else(|| AppError::Validation("Activity description is required".to_string()))?
        .to_string();
    let deadline = form
        .text("deadline")
        .ok_or_else(|| AppError::Validation("Activity deadline is required".to_string()))
        .and_then(|raw| {
            parse_deadline(raw)
                .ok_or_else(|| AppError::Validation(format!("Invalid deadline: {raw}")))
        })?;

    let attachments = store_attachments(&state, &mut form).await?;

    let activity = db::activities::create(
        &state.pool,
        &name,
        &description,
        deadline,
        &attachments,
        auth.account_id,
    )
    .await?;

    announce_activity(&state, &activity).await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Activity created",
            "activity": activity,
        })),
    ))
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Activity>>, AppError> {
    let activities = db::activities::list(&state.pool).await?;
    Ok(Json(activities))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, AppError> {
    let activity = db::activities::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;
    Ok(Json(activity))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let mut form = upload::parse_form(&headers, body)
        .await
        .map_err(AppError::Validation)?;

    let deadline = match form.text("deadline") {
        Some(raw) => Some(
            parse_deadline(raw)
                .ok_or_else(|| AppError::Validation(format!("Invalid deadline: {raw}")))?,
        ),
        None => None,
    };
    let name = form.text("name").map(str::to_string);
    let description = form.text("description").map(str::to_string);

    let new_attachments = store_attachments(&state, &mut form).await?;

    let activity = db::activities::update(
        &state.pool,
        id,
        name.as_deref(),
        description.as_deref(),
        deadline,
        &new_attachments,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Activity not found".to_string()),
        _ => AppError::Database(e),
    })?;

    Ok(Json(serde_json::json!({
        "message": "Activity updated",
        "activity": activity,
    })))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let deleted = db::activities::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::NotFound("Activity not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Activity deleted" })))
}

/// Review-panel listing for one activity.
pub async fn list_submissions(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SubmissionDetailRow>>, AppError> {
    auth.require_admin()?;

    let rows = db::submissions::list_with_details(&state.pool, Some(id)).await?;
    Ok(Json(rows))
}

async fn store_attachments(
    state: &SharedState,
    form: &mut upload::ParsedForm,
) -> Result<Vec<FileRef>, AppError> {
    let mut refs = Vec::new();
    for file in form.take_files("attachments") {
        let stored = upload::store_file(&state.config.upload_dir, ATTACHMENT_SUBDIR, &file)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store attachment: {e}")))?;
        refs.push(stored);
    }
    Ok(refs)
}

/// Queue a "new activity" notice for every active learner. Enqueue failures
/// are isolated per recipient and never fail the create.
async fn announce_activity(state: &SharedState, activity: &Activity) {
    let learners = match db::accounts::list_active_learners(&state.pool).await {
        Ok(learners) => learners,
        Err(e) => {
            tracing::error!("Failed to list learners for announcement: {e}");
            return;
        }
    };

    let subject = templates::activity_subject(&activity.name);
    let body = templates::render_activity_published(
        &activity.name,
        &activity.description,
        activity.deadline,
    );

    for learner in learners {
        if let Err(e) =
            db::notifications::enqueue(&state.pool, &learner.email, &subject, &body).await
        {
            tracing::error!("Failed to queue announcement for {}: {e}", learner.email);
        }
    }
}
