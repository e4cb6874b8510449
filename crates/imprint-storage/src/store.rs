//! The artifact custody store.
//!
//! A document's custody moves `STAGED -> PROMOTED -> DELETED`, with a
//! parallel `STAGED -> RECLAIMED` exit taken only by the retention sweep.
//! Staged files are uniquely named, so no two flows ever contend for the
//! same path; the one race that matters (sweep reclaims while a promotion is
//! in flight) resolves by promotion failing with [`StorageError::StagedMissing`].

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use imprint_core::models::StagedFileEntry;
use imprint_core::AppError;

use crate::paths::{partition_key, resolve_within};

const TEMP_DIR: &str = "temp";
const ORDERS_DIR: &str = "orders";
const PROOFS_DIR: &str = "proofs";

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Staged artifact not found: {0}")]
    StagedMissing(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::StagedMissing(handle) => AppError::InvalidInput(format!(
                "Staged document not found or expired: {}",
                handle
            )),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Outcome of one retention sweep over the temp area.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    pub files_deleted: usize,
    pub partitions_removed: usize,
}

/// Date-partitioned filesystem custody for uploaded documents, promoted
/// order files, and payment proofs.
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`, creating the three custody areas if
    /// absent.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        for area in [TEMP_DIR, ORDERS_DIR, PROOFS_DIR] {
            fs::create_dir_all(root.join(area)).await?;
        }
        Ok(ArtifactStore { root })
    }

    fn temp_root(&self) -> PathBuf {
        self.root.join(TEMP_DIR)
    }

    /// Resolve a staging handle (`<date>/<file>`) inside the temp area.
    pub fn resolve_staged(&self, handle: &str) -> StorageResult<PathBuf> {
        resolve_within(&self.temp_root(), handle)
    }

    /// Resolve an `orders/...` or `proofs/...` key inside the store root.
    pub fn resolve_key(&self, key: &str) -> StorageResult<PathBuf> {
        resolve_within(&self.root, key)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Stage uploaded bytes under today's partition. Returns the staging
    /// handle (`<date>/<uuid>-<name>`).
    pub async fn stage(&self, data: &[u8], sanitized_name: &str) -> StorageResult<String> {
        let partition = partition_key(Utc::now().date_naive());
        let filename = format!("{}-{}", Uuid::new_v4(), sanitized_name);
        let handle = format!("{}/{}", partition, filename);
        let path = self.resolve_staged(&handle)?;

        self.write_file(&path, data).await?;

        tracing::info!(
            handle = %handle,
            size_bytes = data.len(),
            "Staged uploaded document"
        );
        Ok(handle)
    }

    /// Promote a staged document into permanent order storage.
    ///
    /// The file is moved, not copied. A missing source means the artifact was
    /// reclaimed, already promoted, or never existed; the caller must reject
    /// the confirmation rather than record a dangling path.
    pub async fn promote(
        &self,
        handle: &str,
        order_id: &str,
        original_name: &str,
    ) -> StorageResult<String> {
        let source = self.resolve_staged(handle)?;
        if !fs::try_exists(&source).await.unwrap_or(false) {
            return Err(StorageError::StagedMissing(handle.to_string()));
        }

        let partition = partition_key(Utc::now().date_naive());
        let final_key = format!(
            "{}/{}/{}-{}",
            ORDERS_DIR, partition, order_id, original_name
        );
        let destination = self.resolve_key(&final_key)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::rename(&source, &destination).await.map_err(|e| {
            // Lost the race with the sweeper between the existence check and
            // the rename: same outcome as an expired handle.
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::StagedMissing(handle.to_string())
            } else {
                StorageError::IoError(e)
            }
        })?;

        tracing::info!(
            handle = %handle,
            final_key = %final_key,
            order_id = %order_id,
            "Promoted staged document to order storage"
        );
        Ok(final_key)
    }

    /// Store a payment-proof image for an order. Returns its storage key.
    pub async fn store_proof(
        &self,
        data: &[u8],
        extension: &str,
        order_id: &str,
    ) -> StorageResult<String> {
        let partition = partition_key(Utc::now().date_naive());
        let proof_key = format!(
            "{}/{}/{}-proof.{}",
            PROOFS_DIR, partition, order_id, extension
        );
        let path = self.resolve_key(&proof_key)?;

        self.write_file(&path, data).await?;

        tracing::info!(
            proof_key = %proof_key,
            order_id = %order_id,
            size_bytes = data.len(),
            "Stored payment proof"
        );
        Ok(proof_key)
    }

    /// Best-effort deletion of an order's document and proof files.
    ///
    /// The database record is authoritative; filesystem failures are logged
    /// and counted, never escalated. Already-deleted files are a no-op.
    pub async fn delete_order_files(&self, file_key: &str, proof_key: &str) -> usize {
        let mut failures = 0;
        for key in [file_key, proof_key] {
            match self.resolve_key(key) {
                Ok(path) => match fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        tracing::warn!(error = %e, key = %key, "Failed to delete order file");
                        failures += 1;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Refusing to delete unresolvable key");
                    failures += 1;
                }
            }
        }
        failures
    }

    /// Enumerate staged uploads across all date partitions, newest first.
    /// A missing temp root yields an empty listing.
    pub async fn list_staged(&self) -> StorageResult<Vec<StagedFileEntry>> {
        let temp_root = self.temp_root();
        let mut partitions = match fs::read_dir(&temp_root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(partition) = partitions.next_entry().await? {
            if !partition.file_type().await?.is_dir() {
                continue;
            }
            let partition_name = partition.file_name().to_string_lossy().to_string();
            let mut files = fs::read_dir(partition.path()).await?;
            while let Some(file) = files.next_entry().await? {
                let metadata = match file.metadata().await {
                    Ok(m) if m.is_file() => m,
                    _ => continue,
                };
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                let name = file.file_name().to_string_lossy().to_string();
                entries.push(StagedFileEntry {
                    path: format!("{}/{}", partition_name, name),
                    name,
                    size: metadata.len(),
                    modified_at: DateTime::<Utc>::from(modified),
                });
            }
        }

        entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(entries)
    }

    /// Delete staged uploads by relative path.
    ///
    /// Every path is containment-validated before anything is touched; a
    /// path that escapes the temp root is reported, never resolved. Returns
    /// the deleted count and per-path errors (partial success is explicit).
    pub async fn delete_staged(&self, paths: &[String]) -> (usize, Vec<String>) {
        let mut deleted = 0;
        let mut errors = Vec::new();

        for relative in paths {
            let path = match self.resolve_staged(relative) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(path = %relative, error = %e, "Rejected staged deletion request");
                    errors.push(format!("{}: {}", relative, e));
                    continue;
                }
            };
            match fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                // Concurrently-reclaimed files count as deleted.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => deleted += 1,
                Err(e) => errors.push(format!("{}: {}", relative, e)),
            }
        }

        if deleted > 0 {
            tracing::info!(deleted, errors = errors.len(), "Deleted staged uploads");
        }
        (deleted, errors)
    }

    /// Reclaim staged files last modified before `cutoff`, then prune date
    /// partitions left empty. Idempotent; a missing temp root is zero work.
    pub async fn reclaim_staged(&self, cutoff: SystemTime) -> StorageResult<SweepStats> {
        let temp_root = self.temp_root();
        let mut stats = SweepStats::default();

        let mut partitions = match fs::read_dir(&temp_root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(stats),
            Err(e) => return Err(e.into()),
        };

        let mut partition_dirs = Vec::new();
        while let Some(partition) = partitions.next_entry().await? {
            if partition.file_type().await?.is_dir() {
                partition_dirs.push(partition.path());
            }
        }

        for dir in &partition_dirs {
            let mut files = fs::read_dir(dir).await?;
            while let Some(file) = files.next_entry().await? {
                let metadata = match file.metadata().await {
                    Ok(m) if m.is_file() => m,
                    _ => continue,
                };
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                if modified < cutoff {
                    match fs::remove_file(file.path()).await {
                        Ok(()) => {
                            tracing::info!(path = %file.path().display(), "Reclaimed expired staged upload");
                            stats.files_deleted += 1;
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => {
                            tracing::warn!(error = %e, path = %file.path().display(), "Failed to reclaim staged upload");
                        }
                    }
                }
            }
        }

        // Second pass: prune partitions emptied by this (or an earlier) sweep.
        for dir in &partition_dirs {
            let mut files = match fs::read_dir(dir).await {
                Ok(rd) => rd,
                Err(_) => continue,
            };
            if files.next_entry().await?.is_none() {
                match fs::remove_dir(dir).await {
                    Ok(()) => {
                        tracing::info!(path = %dir.display(), "Removed empty staging partition");
                        stats.partitions_removed += 1;
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, path = %dir.display(), "Could not remove staging partition");
                    }
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn test_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn stage_writes_under_dated_partition() {
        let (_dir, store) = test_store().await;
        let handle = store.stage(b"pdf bytes", "report.pdf").await.unwrap();

        let today = partition_key(Utc::now().date_naive());
        assert!(handle.starts_with(&today));
        assert!(handle.ends_with("-report.pdf"));

        let path = store.resolve_staged(&handle).unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"pdf bytes");
    }

    #[tokio::test]
    async fn promote_moves_not_copies() {
        let (dir, store) = test_store().await;
        let handle = store.stage(b"document body", "thesis.pdf").await.unwrap();
        let source = store.resolve_staged(&handle).unwrap();

        let final_key = store.promote(&handle, "ORD-9", "thesis.pdf").await.unwrap();

        assert!(!source.exists());
        let destination = store.resolve_key(&final_key).unwrap();
        assert_eq!(fs::read(&destination).await.unwrap(), b"document body");
        assert!(final_key.starts_with("orders/"));
        assert!(final_key.ends_with("ORD-9-thesis.pdf"));
        drop(dir);
    }

    #[tokio::test]
    async fn promote_missing_handle_fails_distinctly() {
        let (_dir, store) = test_store().await;
        let err = store
            .promote("2026-01-01/gone.pdf", "ORD-1", "gone.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::StagedMissing(_)));
    }

    #[tokio::test]
    async fn promote_rejects_escaping_handle() {
        let (_dir, store) = test_store().await;
        let err = store
            .promote("../orders/sneaky.pdf", "ORD-1", "sneaky.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn store_proof_uses_order_id_and_extension() {
        let (_dir, store) = test_store().await;
        let key = store.store_proof(b"jpeg", "jpg", "ORD-7").await.unwrap();
        assert!(key.starts_with("proofs/"));
        assert!(key.ends_with("ORD-7-proof.jpg"));

        let path = store.resolve_key(&key).unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn delete_order_files_tolerates_missing() {
        let (_dir, store) = test_store().await;
        let proof_key = store.store_proof(b"img", "png", "ORD-2").await.unwrap();

        // Document file never existed; proof does. Missing files are a no-op.
        let failures = store
            .delete_order_files("orders/2026-01-01/ORD-2-doc.pdf", &proof_key)
            .await;
        assert_eq!(failures, 0);
        assert!(!store.resolve_key(&proof_key).unwrap().exists());
    }

    #[tokio::test]
    async fn delete_order_files_counts_unresolvable_keys() {
        let (_dir, store) = test_store().await;
        let failures = store.delete_order_files("../evil.pdf", "/abs.png").await;
        assert_eq!(failures, 2);
    }

    #[tokio::test]
    async fn list_staged_reports_entries_newest_first() {
        let (_dir, store) = test_store().await;
        store.stage(b"first", "a.pdf").await.unwrap();
        store.stage(b"second-longer", "b.pdf").await.unwrap();

        let entries = store.list_staged().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].modified_at >= entries[1].modified_at);
        assert!(entries.iter().any(|e| e.size == 5));
        assert!(entries.iter().all(|e| e.path.contains('/')));
    }

    #[tokio::test]
    async fn delete_staged_guards_against_traversal() {
        let (dir, store) = test_store().await;
        // A file outside the temp area that a traversal would reach.
        let outside = dir.path().join("orders");
        let marker = outside.join("marker.txt");
        fs::write(&marker, b"keep me").await.unwrap();

        let (deleted, errors) = store
            .delete_staged(&["../orders/marker.txt".to_string()])
            .await;

        assert_eq!(deleted, 0);
        assert_eq!(errors.len(), 1);
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn delete_staged_reports_partial_success() {
        let (_dir, store) = test_store().await;
        let handle = store.stage(b"data", "doc.pdf").await.unwrap();

        let (deleted, errors) = store
            .delete_staged(&[handle.clone(), "../escape.pdf".to_string()])
            .await;

        assert_eq!(deleted, 1);
        assert_eq!(errors.len(), 1);
        assert!(!store.resolve_staged(&handle).unwrap().exists());
    }

    #[tokio::test]
    async fn reclaim_retains_fresh_files_and_partitions() {
        let (_dir, store) = test_store().await;
        let handle = store.stage(b"fresh", "doc.pdf").await.unwrap();

        let cutoff = SystemTime::now() - Duration::from_secs(3600);
        let stats = store.reclaim_staged(cutoff).await.unwrap();

        assert_eq!(stats.files_deleted, 0);
        assert_eq!(stats.partitions_removed, 0);
        assert!(store.resolve_staged(&handle).unwrap().exists());
    }

    #[tokio::test]
    async fn reclaim_deletes_expired_files_and_prunes_partitions() {
        let (_dir, store) = test_store().await;
        let handle = store.stage(b"stale", "doc.pdf").await.unwrap();

        // Everything on disk is older than a future cutoff.
        let cutoff = SystemTime::now() + Duration::from_secs(3600);
        let stats = store.reclaim_staged(cutoff).await.unwrap();

        assert_eq!(stats.files_deleted, 1);
        assert_eq!(stats.partitions_removed, 1);
        assert!(!store.resolve_staged(&handle).unwrap().exists());

        // Idempotent: a second sweep finds nothing.
        let stats = store.reclaim_staged(cutoff).await.unwrap();
        assert_eq!(stats.files_deleted, 0);
        assert_eq!(stats.partitions_removed, 0);
    }

    #[tokio::test]
    async fn reclaim_removes_already_empty_partitions() {
        let (dir, store) = test_store().await;
        let empty = dir.path().join("temp").join("2026-01-01");
        fs::create_dir_all(&empty).await.unwrap();

        let cutoff = SystemTime::now() - Duration::from_secs(3600);
        let stats = store.reclaim_staged(cutoff).await.unwrap();

        assert_eq!(stats.partitions_removed, 1);
        assert!(!empty.exists());
    }

    #[tokio::test]
    async fn reclaim_tolerates_missing_temp_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).await.unwrap();
        fs::remove_dir_all(dir.path().join("temp")).await.unwrap();

        let stats = store
            .reclaim_staged(SystemTime::now())
            .await
            .unwrap();
        assert_eq!(stats.files_deleted, 0);

        let listed = store.list_staged().await.unwrap();
        assert!(listed.is_empty());
    }
}
