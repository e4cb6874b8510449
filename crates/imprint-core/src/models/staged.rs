use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One staged upload, as listed by the administrative surface.
///
/// `path` is relative to the temp storage root (`<date>/<file>`) and doubles
/// as the staging handle accepted by promotion and deletion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StagedFileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}
