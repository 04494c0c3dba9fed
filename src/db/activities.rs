use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Activity, FileRef};

pub async fn create(
    pool: &PgPool,
    name: &str,
    description: &str,
    deadline: DateTime<Utc>,
    attachments: &[FileRef],
    created_by: Uuid,
) -> Result<Activity, sqlx::Error> {
    sqlx::query_as::<_, Activity>(
        "INSERT INTO activities (name, description, deadline, attachments, created_by)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(deadline)
    .bind(Json(attachments))
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>("SELECT * FROM activities ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

/// Partial update: absent fields keep their stored value; supplied attachments
/// are appended to the existing list, never replace it.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
    deadline: Option<DateTime<Utc>>,
    new_attachments: &[FileRef],
) -> Result<Activity, sqlx::Error> {
    sqlx::query_as::<_, Activity>(
        "UPDATE activities
         SET name = COALESCE($2, name),
             description = COALESCE($3, description),
             deadline = COALESCE($4, deadline),
             attachments = attachments || $5,
             updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(deadline)
    .bind(Json(new_attachments))
    .fetch_one(pool)
    .await
}

/// Returns false when the id did not exist.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
