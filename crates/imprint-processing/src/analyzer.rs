//! Document analysis orchestration.
//!
//! `analyze` turns an uploaded document into a per-page color/grayscale
//! partition and a staged artifact awaiting order confirmation. The scratch
//! workspace holding the document for the rasterizer is a `TempDir`, removed
//! on drop on every exit path, so an abandoned or failed analysis never
//! leaks temp files.

use std::sync::Arc;

use imprint_core::{sanitize_filename, AppError};
use imprint_storage::ArtifactStore;

use crate::classifier::{classify, PageKind};
use crate::page_ranges::format_page_ranges;
use crate::rasterizer::Rasterizer;

/// Per-page partition of one document. The two page sets are disjoint and
/// together cover 1..=N; `from_kinds` is the only constructor.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub color_pages: Vec<u32>,
    pub grayscale_pages: Vec<u32>,
    pub color_page_range: String,
    pub grayscale_page_range: String,
}

impl ClassificationResult {
    fn from_kinds(kinds: &[(u32, PageKind)]) -> Self {
        let mut color_pages = Vec::new();
        let mut grayscale_pages = Vec::new();
        for &(number, kind) in kinds {
            match kind {
                PageKind::Color => color_pages.push(number),
                PageKind::Grayscale => grayscale_pages.push(number),
            }
        }
        ClassificationResult {
            color_page_range: format_page_ranges(&color_pages),
            grayscale_page_range: format_page_ranges(&grayscale_pages),
            color_pages,
            grayscale_pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.color_pages.len() + self.grayscale_pages.len()
    }
}

/// Result of analyzing one upload: the classification plus the staging
/// handle needed to confirm an order for it later.
#[derive(Debug)]
pub struct DocumentAnalysis {
    pub classification: ClassificationResult,
    pub staging_handle: String,
    pub original_name: String,
}

pub struct DocumentAnalyzer {
    rasterizer: Arc<dyn Rasterizer>,
    store: Arc<ArtifactStore>,
}

impl DocumentAnalyzer {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, store: Arc<ArtifactStore>) -> Self {
        Self { rasterizer, store }
    }

    /// Rasterize and classify every page of the uploaded document, then
    /// stage the original bytes for a later confirmation.
    ///
    /// Converter failure is fatal to the request and surfaced as an analysis
    /// error; it is never retried here. A single page that fails to render
    /// is classified grayscale (fail safe toward the cheaper bucket) and the
    /// failure goes to the log, not the caller.
    pub async fn analyze(
        &self,
        data: &[u8],
        original_filename: &str,
    ) -> Result<DocumentAnalysis, AppError> {
        let sanitized_name = sanitize_filename(original_filename)?;

        // Scratch workspace for the rasterizer; removed on drop regardless
        // of how this function exits.
        let scratch = tempfile::tempdir()
            .map_err(|e| AppError::Internal(format!("Failed to create scratch dir: {}", e)))?;
        let document_path = scratch.path().join("document.pdf");
        tokio::fs::write(&document_path, data).await?;

        let pages = self.rasterizer.render(&document_path).await?;

        let kinds: Vec<(u32, PageKind)> = pages
            .iter()
            .map(|page| match &page.image {
                Some(image) => (page.number, classify(image)),
                None => {
                    tracing::error!(
                        page = page.number,
                        "Page image unavailable; classifying as grayscale"
                    );
                    (page.number, PageKind::Grayscale)
                }
            })
            .collect();

        let classification = ClassificationResult::from_kinds(&kinds);

        let staging_handle = self.store.stage(data, &sanitized_name).await?;

        tracing::info!(
            pages = classification.page_count(),
            color = classification.color_pages.len(),
            grayscale = classification.grayscale_pages.len(),
            handle = %staging_handle,
            "Document analyzed and staged"
        );

        Ok(DocumentAnalysis {
            classification,
            staging_handle,
            original_name: sanitized_name,
        })
    }
}
