use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db;
use crate::state::SharedState;

/// Spawn the notification dispatchers. Each worker polls the outbox, claims
/// one row at a time, and hands it to the mailer; review and registry
/// operations are already durable by the time anything lands here.
pub fn spawn(
    state: SharedState,
    shutdown: watch::Receiver<bool>,
    count: usize,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| tokio::spawn(run(id, state.clone(), shutdown.clone())))
        .collect()
}

async fn run(id: usize, state: SharedState, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Notification worker {id} started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        match process_next(&state).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Notification worker {id} error: {e}");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
            _ = shutdown.changed() => {}
        }
    }

    tracing::debug!("Notification worker {id} stopped");
}

/// Try to claim and deliver the next queued notification. Returns true if a
/// row was claimed.
async fn process_next(state: &SharedState) -> Result<bool, String> {
    let item = db::notifications::claim_next(&state.pool)
        .await
        .map_err(|e| format!("Failed to claim notification: {e}"))?;

    let item = match item {
        Some(item) => item,
        None => return Ok(false),
    };

    tracing::debug!(
        "Delivering notification {} to {} (attempt {})",
        item.id,
        item.recipient,
        item.attempts
    );

    let mailer = match &state.mailer {
        Some(mailer) => mailer,
        None => {
            let _ = db::notifications::mark_failed(
                &state.pool,
                item.id,
                item.attempts,
                "SMTP not configured",
            )
            .await;
            return Ok(true);
        }
    };

    let outcome = match tokio::time::timeout(
        std::time::Duration::from_secs(30),
        mailer.send(&item.recipient, &item.subject, &item.body),
    )
    .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err("Send timed out after 30s".to_string()),
    };

    match outcome {
        Ok(()) => {
            let _ = db::notifications::mark_sent(&state.pool, item.id).await;
        }
        Err(error) => {
            tracing::warn!("Notification {} delivery failed: {error}", item.id);
            let _ =
                db::notifications::mark_failed(&state.pool, item.id, item.attempts, &error).await;
        }
    }

    Ok(true)
}
