use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Notification;

pub async fn enqueue(
    pool: &PgPool,
    recipient: &str,
    subject: &str,
    body: &str,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "INSERT INTO notifications (recipient, subject, body)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(recipient)
    .bind(subject)
    .bind(body)
    .fetch_one(pool)
    .await
}

/// Atomically claim the next ready notification using FOR UPDATE SKIP LOCKED,
/// so concurrent workers never grab the same row.
pub async fn claim_next(pool: &PgPool) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "UPDATE notifications SET status = 'sending', attempts = attempts + 1
         WHERE id = (
             SELECT id FROM notifications
             WHERE status IN ('pending', 'failed')
               AND attempts < max_attempts
               AND next_attempt_at <= now()
             ORDER BY next_attempt_at ASC
             LIMIT 1
             FOR UPDATE SKIP LOCKED
         )
         RETURNING *",
    )
    .fetch_optional(pool)
    .await
}

pub async fn mark_sent(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE notifications SET status = 'sent', sent_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Record a delivery failure with exponential backoff. Once the attempt
/// budget is spent the row stays 'failed' and is never claimed again.
pub async fn mark_failed(pool: &PgPool, id: Uuid, attempts: i32, error: &str) -> Result<(), sqlx::Error> {
    let backoff_secs = 2_i64.pow(attempts.max(0) as u32);
    sqlx::query(
        "UPDATE notifications
         SET status = 'failed',
             last_error = $2,
             next_attempt_at = now() + make_interval(secs => $3::double precision)
         WHERE id = $1",
    )
    .bind(id)
    .bind(error)
    .bind(backoff_secs as f64)
    .execute(pool)
    .await?;
    Ok(())
}
