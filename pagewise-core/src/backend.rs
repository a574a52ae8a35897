//! Contract with the document parser/rasterizer.
//!
//! The core never parses files itself. A backend opens a document and the
//! document renders individual pages to RGBA buffers on request.

use crate::error::BackendError;
use image::RgbaImage;
use std::path::Path;

/// Typographic points per inch, the unit page sizes are reported in.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Page size in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// Pixel dimensions of this page when rasterized at `dpi`.
    pub fn to_pixels(&self, dpi: u32) -> (u32, u32) {
        let scale = dpi as f32 / POINTS_PER_INCH;
        (
            (self.width * scale).round().max(1.0) as u32,
            (self.height * scale).round().max(1.0) as u32,
        )
    }
}

/// An opened document.
pub trait Document {
    fn page_count(&self) -> usize;

    fn page_size(&self, index: usize) -> Result<PageSize, BackendError>;

    fn render_page(
        &self,
        index: usize,
        horizontal_dpi: u32,
        vertical_dpi: u32,
    ) -> Result<RgbaImage, BackendError>;

    /// Title from document metadata, when it has one.
    fn title(&self) -> Option<String> {
        None
    }
}

/// Opens documents. Locked documents are reported as failures, same as unparseable ones.
pub trait DocumentBackend {
    type Document: Document;

    fn open(&self, path: &Path) -> Result<Self::Document, BackendError>;
}
