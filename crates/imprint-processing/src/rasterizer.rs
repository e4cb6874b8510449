//! PDF rasterization: render every page of a document to an image via pdfium.
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which keeps
//! thread-local state and is not safe to call from async contexts, so all
//! rendering runs inside `tokio::task::spawn_blocking`. Page sizes vary
//! wildly; capping the longest rendered edge (rather than fixing a DPI)
//! keeps memory bounded for oversized pages while leaving plenty of
//! resolution for color sampling.

use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use thiserror::Error;

use imprint_core::AppError;

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("document could not be decoded: {0}")]
    Decode(String),

    #[error("rasterizer task failed: {0}")]
    Task(String),
}

impl From<RasterizeError> for AppError {
    fn from(err: RasterizeError) -> Self {
        match err {
            RasterizeError::Decode(msg) => AppError::Rasterize(msg),
            RasterizeError::Task(msg) => AppError::Internal(msg),
        }
    }
}

/// One rasterized page, in document order. `image` is `None` when this page
/// failed to render; the classifier treats such pages fail-safe.
pub struct PageImage {
    pub number: u32,
    pub image: Option<DynamicImage>,
}

/// Seam over the external PDF-to-raster converter.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Render the document at `path` into one image per page, in page order.
    /// Fails only when the document itself cannot be decoded.
    async fn render(&self, path: &Path) -> Result<Vec<PageImage>, RasterizeError>;
}

/// pdfium-backed rasterizer.
pub struct PdfiumRasterizer {
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(max_pixels: u32) -> Self {
        Self { max_pixels }
    }
}

#[async_trait]
impl Rasterizer for PdfiumRasterizer {
    async fn render(&self, path: &Path) -> Result<Vec<PageImage>, RasterizeError> {
        let path = path.to_path_buf();
        let max_pixels = self.max_pixels;

        tokio::task::spawn_blocking(move || render_blocking(&path, max_pixels))
            .await
            .map_err(|e| RasterizeError::Task(format!("render task panicked: {}", e)))?
    }
}

fn render_blocking(path: &Path, max_pixels: u32) -> Result<Vec<PageImage>, RasterizeError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| RasterizeError::Decode(format!("{:?}", e)))?;

    let pages = document.pages();
    tracing::debug!(page_count = pages.len(), "Document loaded for rasterization");

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(pages.len() as usize);
    for (index, page) in pages.iter().enumerate() {
        let number = index as u32 + 1;
        match page.render_with_config(&render_config) {
            Ok(bitmap) => {
                let image = bitmap.as_image();
                tracing::debug!(
                    page = number,
                    width = image.width(),
                    height = image.height(),
                    "Rendered page"
                );
                results.push(PageImage {
                    number,
                    image: Some(image),
                });
            }
            Err(e) => {
                tracing::warn!(page = number, error = ?e, "Failed to render page");
                results.push(PageImage {
                    number,
                    image: None,
                });
            }
        }
    }

    Ok(results)
}
