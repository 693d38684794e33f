//! idmark core - identity watermark overlay for existing PDFs
//!
//! This crate provides functionality for:
//! - Opening PDF documents from bytes
//! - Embedding one watermark font (standard Helvetica or a TrueType file)
//! - Laying out a rotated, multi-line text block centred on each page
//! - Tiling reduced copies of the block across the page
//! - Saving the overlaid document back to bytes
//!
//! Original page content, page count and page sizes are left untouched.
//!
//! # Example
//!
//! ```ignore
//! use idmark_core::{apply_watermark, watermark_with_identity, WatermarkRequest};
//!
//! // Name, department and a timestamp, default styling
//! let output = watermark_with_identity(&pdf_bytes, "Nguyễn Văn Anh", "Kế toán", true)?;
//!
//! // Custom lines and styling
//! let request = WatermarkRequest::new(vec!["CONFIDENTIAL".to_string()]);
//! let output = apply_watermark(&pdf_bytes, &request)?;
//! ```

#[cfg(feature = "async")]
mod asynchronous;
mod document;
mod file;
mod font;
mod identity;
mod layout;
mod page;
mod request;
mod text;
mod tiling;
mod watermark;

#[cfg(feature = "async")]
pub use asynchronous::{apply_watermark_async, watermark_with_identity_async};
pub use document::{PageBox, PdfDocument};
pub use file::{is_pdf_like, watermarked_file_name, WatermarkedFile, PDF_CONTENT_TYPE};
pub use font::{
    FontObjects, GlyphMetrics, Helvetica, TrueTypeFont, UnsupportedGlyph, WatermarkFont,
};
pub use identity::{
    compose_user_watermark, compose_user_watermark_at, format_timestamp, TIMESTAMP_FORMAT,
    TIMESTAMP_UTC_OFFSET_SECONDS,
};
pub use layout::{
    block_height, compute_anchor, line_origins, measure_line, rotated_anchor, BlockLayout,
    BlockSize, PageGeometry, Point, ESTIMATED_CHAR_WIDTH_EM,
};
pub use page::{plan_page_runs, render_overlay, Layer, OverlayResources, TextRun};
pub use request::{Color, FontChoice, WatermarkRequest, WatermarkStyle};
pub use text::{generate_text_operators, TextRenderContext};
pub use tiling::{plan_tiles, DEFAULT_TILE_SPACING, TILE_FONT_SCALE, TILE_OPACITY_SCALE};
pub use watermark::{apply_watermark, watermark_with_identity, watermark_with_identity_styled};

use thiserror::Error;

/// Errors that can occur while watermarking a document
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Malformed PDF document: {0}")]
    MalformedDocument(#[from] lopdf::Error),

    #[error("Malformed PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Failed to embed font: {0}")]
    FontEmbedding(String),

    #[error("Failed to serialize PDF: {0}")]
    Serialization(String),

    #[error("Invalid watermark request: {0}")]
    InvalidRequest(String),

    #[error("Watermark task failed: {0}")]
    TaskJoin(String),
}

impl WatermarkError {
    /// True when the input could not be understood as a PDF page tree
    pub fn is_malformed_document(&self) -> bool {
        matches!(
            self,
            WatermarkError::MalformedDocument(_) | WatermarkError::InvalidStructure(_)
        )
    }
}

/// Result type for watermark operations
pub type Result<T> = std::result::Result<T, WatermarkError>;
