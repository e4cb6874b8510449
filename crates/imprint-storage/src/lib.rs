//! Imprint Storage Library
//!
//! On-disk custody for uploaded documents. The [`ArtifactStore`] owns a
//! single root directory with three areas:
//!
//! - `temp/<YYYY-MM-DD>/<uuid>-<name>` — staged uploads awaiting confirmation
//! - `orders/<YYYY-MM-DD>/<order_id>-<name>` — promoted order documents
//! - `proofs/<YYYY-MM-DD>/<order_id>-proof.<ext>` — payment proof images
//!
//! Keys are always relative to the root and must not contain `..` or a
//! leading `/`. Resolution is centralized in the `paths` module so every
//! operation goes through the same containment check.

pub mod paths;
pub mod store;

pub use paths::partition_key;
pub use store::{ArtifactStore, StorageError, StorageResult, SweepStats};
