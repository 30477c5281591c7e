//! Periodic removal of idle ideation sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::sessions::SessionStore;

/// How often idle sessions are looked for.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the sweeper until `cancel` is triggered, dropping sessions unused
/// for at least `ttl`.
pub async fn run(sessions: Arc<SessionStore>, ttl: Duration, cancel: CancellationToken) {
    tracing::info!(
        ttl_secs = ttl.as_secs(),
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Session sweeper started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let purged = sessions.purge_idle(ttl).await;
                if purged > 0 {
                    tracing::info!(purged, "Idle ideation sessions discarded");
                } else {
                    tracing::debug!("No idle ideation sessions");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use commonground_core::ideation::{IdeationWorkflow, ProjectContext};

    use super::*;

    #[tokio::test]
    async fn first_tick_purges_and_cancel_stops() {
        let sessions = Arc::new(SessionStore::new());
        sessions
            .create(
                "anon-1",
                IdeationWorkflow::new(ProjectContext {
                    reference: "p".to_string(),
                    title: "P".to_string(),
                    short_description: "d".to_string(),
                    image: "/images/p.jpg".to_string(),
                    limitations: Vec::new(),
                }),
            )
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(Arc::clone(&sessions), Duration::ZERO, cancel.clone()));

        for _ in 0..100 {
            if sessions.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(sessions.is_empty().await);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
