use sqlx::PgPool;
use uuid::Uuid;

use crate::models::account::{Account, ROLE_LEARNER, STATUS_ACTIVE};

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Recipients for the new-activity announcement.
pub async fn list_active_learners(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT * FROM accounts WHERE role = $1 AND status = $2 ORDER BY created_at",
    )
    .bind(ROLE_LEARNER)
    .bind(STATUS_ACTIVE)
    .fetch_all(pool)
    .await
}
