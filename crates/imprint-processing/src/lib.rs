//! Imprint Processing Library
//!
//! Page-level document analysis: rasterization of an uploaded PDF into page
//! images, per-page color/grayscale classification, and run-length page-range
//! encoding. The [`DocumentAnalyzer`] ties these together and stages the
//! original document for later order confirmation.

pub mod analyzer;
pub mod classifier;
pub mod page_ranges;
pub mod rasterizer;

pub use analyzer::{ClassificationResult, DocumentAnalysis, DocumentAnalyzer};
pub use classifier::{classify, PageKind};
pub use page_ranges::format_page_ranges;
pub use rasterizer::{PageImage, PdfiumRasterizer, Rasterizer, RasterizeError};
