//! TTL-based reclamation of staged uploads that were never confirmed.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::time::interval;

use imprint_storage::{ArtifactStore, SweepStats};

/// Periodically reclaims staged uploads older than the configured TTL and
/// prunes the date partitions they leave empty. Safe to re-run on any
/// schedule: a sweep with no new expirations deletes nothing.
#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<ArtifactStore>,
    ttl: Duration,
    period: Duration,
}

impl RetentionSweeper {
    pub fn new(store: Arc<ArtifactStore>, ttl: Duration, period: Duration) -> Self {
        Self { store, ttl, period }
    }

    /// Run a single sweep now.
    pub async fn run_once(&self) -> Result<SweepStats, anyhow::Error> {
        let cutoff = SystemTime::now() - self.ttl;
        let stats = self.store.reclaim_staged(cutoff).await?;

        if stats.files_deleted > 0 || stats.partitions_removed > 0 {
            tracing::info!(
                files_deleted = stats.files_deleted,
                partitions_removed = stats.partitions_removed,
                "Retention sweep reclaimed staged uploads"
            );
        } else {
            tracing::debug!("Retention sweep found nothing to reclaim");
        }
        Ok(stats)
    }

    /// Start the background sweep task. The first tick fires immediately,
    /// which doubles as the boot-time sweep. Returns a JoinHandle for
    /// graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.period);

            loop {
                sweep_interval.tick().await;

                if let Err(e) = self.run_once().await {
                    tracing::error!(error = %e, "Retention sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_uploads_survive_a_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ArtifactStore::new(dir.path()).await.unwrap());
        let handle = store.stage(b"data", "doc.pdf").await.unwrap();

        let sweeper = RetentionSweeper::new(
            store.clone(),
            Duration::from_secs(30 * 24 * 3600),
            Duration::from_secs(3600),
        );
        let stats = sweeper.run_once().await.unwrap();

        assert_eq!(stats.files_deleted, 0);
        assert!(store.resolve_staged(&handle).unwrap().exists());
    }

    #[tokio::test]
    async fn sweep_tolerates_missing_staging_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ArtifactStore::new(dir.path()).await.unwrap());
        tokio::fs::remove_dir_all(dir.path().join("temp"))
            .await
            .unwrap();

        let sweeper = RetentionSweeper::new(
            store,
            Duration::from_secs(0),
            Duration::from_secs(3600),
        );
        let stats = sweeper.run_once().await.unwrap();
        assert_eq!(stats.files_deleted, 0);
        assert_eq!(stats.partitions_removed, 0);
    }
}
