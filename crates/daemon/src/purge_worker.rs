use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use common::prelude::SecretStore;

/// Periodically removes expired secrets until shutdown is signalled.
///
/// Expired entries are already unreadable; this only reclaims space.
pub async fn run_purger<S: SecretStore>(
    store: S,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_secs = interval.as_secs(), "purge worker started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "purged expired secrets"),
                    Err(e) => tracing::warn!("failed to purge expired secrets: {}", e),
                }
            }
            _ = shutdown_rx.changed() => {
                tracing::info!("purge worker shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_purges_on_interval_and_stops() {
        let store = MemoryStore::new();
        store
            .set("short", b"x".to_vec(), Duration::from_secs(1))
            .await
            .unwrap();
        store
            .set("long", b"y".to_vec(), Duration::from_secs(3600))
            .await
            .unwrap();

        let (tx, rx) = watch::channel(());
        let worker = tokio::spawn(run_purger(store.clone(), Duration::from_secs(10), rx));

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(store.len(), 1);

        tx.send(()).unwrap();
        worker.await.unwrap();
    }
}
