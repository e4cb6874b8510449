//! Shared key construction and containment-validated path resolution.

use std::path::{Component, Path, PathBuf};

use crate::store::{StorageError, StorageResult};

/// Date-partition directory name for a given day (`YYYY-MM-DD`).
pub fn partition_key(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Resolve a relative key against `root`, rejecting anything that could
/// escape it.
///
/// Keys are produced by this crate or supplied by administrative clients;
/// either way they must stay strictly inside the configured root.
pub(crate) fn resolve_within(root: &Path, key: &str) -> StorageResult<PathBuf> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty storage key".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "storage key contains invalid characters: {}",
            key
        )));
    }
    for component in Path::new(key).components() {
        match component {
            Component::Normal(_) => {}
            _ => {
                return Err(StorageError::InvalidKey(format!(
                    "storage key resolves outside storage directory: {}",
                    key
                )))
            }
        }
    }
    Ok(root.join(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_key_is_iso_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(partition_key(date), "2026-08-06");
    }

    #[test]
    fn resolve_within_accepts_relative_keys() {
        let root = Path::new("/srv/imprint");
        let path = resolve_within(root, "2026-08-06/abc-doc.pdf").unwrap();
        assert_eq!(path, Path::new("/srv/imprint/2026-08-06/abc-doc.pdf"));
    }

    #[test]
    fn resolve_within_rejects_traversal() {
        let root = Path::new("/srv/imprint");
        assert!(resolve_within(root, "../outside.pdf").is_err());
        assert!(resolve_within(root, "a/../../outside.pdf").is_err());
        assert!(resolve_within(root, "/etc/passwd").is_err());
        assert!(resolve_within(root, "a\\..\\b").is_err());
        assert!(resolve_within(root, "").is_err());
    }
}
