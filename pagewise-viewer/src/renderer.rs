use anyhow::{Context, Result};
use image::RgbaImage;
use pagewise_core::{BackendError, Document, DocumentBackend, PageSize};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

/// PDF backend using pdfium-render
pub struct PdfiumBackend {
    pdfium: &'static Pdfium,
}

impl PdfiumBackend {
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?;

        // Documents borrow the bindings for as long as they live, and the
        // bindings live as long as the process.
        let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));
        Ok(Self { pdfium })
    }
}

impl DocumentBackend for PdfiumBackend {
    type Document = PdfiumDocument;

    fn open(&self, path: &Path) -> Result<PdfiumDocument, BackendError> {
        let inner = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| match e {
                PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                    BackendError::Locked {
                        path: path.to_path_buf(),
                    }
                }
                other => BackendError::Open {
                    path: path.to_path_buf(),
                    reason: other.to_string(),
                },
            })?;

        tracing::debug!(
            "Opened {} with {} pages",
            path.display(),
            inner.pages().len()
        );
        Ok(PdfiumDocument {
            path: path.to_path_buf(),
            inner,
        })
    }
}

pub struct PdfiumDocument {
    path: PathBuf,
    inner: PdfDocument<'static>,
}

impl PdfiumDocument {
    fn page(&self, index: usize) -> Result<PdfPage<'_>, BackendError> {
        let out_of_range = || BackendError::PageOutOfRange {
            index,
            count: self.page_count(),
        };
        let index = u16::try_from(index).map_err(|_| out_of_range())?;
        self.inner.pages().get(index).map_err(|_| out_of_range())
    }
}

impl std::fmt::Debug for PdfiumDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumDocument")
            .field("path", &self.path)
            .field("page_count", &self.page_count())
            .finish()
    }
}

impl Document for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.inner.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize, BackendError> {
        let page = self.page(index)?;
        Ok(PageSize {
            width: page.width().value,
            height: page.height().value,
        })
    }

    fn render_page(
        &self,
        index: usize,
        horizontal_dpi: u32,
        vertical_dpi: u32,
    ) -> Result<RgbaImage, BackendError> {
        let page = self.page(index)?;
        let size = PageSize {
            width: page.width().value,
            height: page.height().value,
        };
        let (render_width, _) = size.to_pixels(horizontal_dpi);
        let (_, render_height) = size.to_pixels(vertical_dpi);

        let render_config = PdfRenderConfig::new()
            .set_target_width(render_width as i32)
            .set_maximum_height(render_height as i32)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let render_error = |reason: String| BackendError::Render { index, reason };
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| render_error(e.to_string()))?;

        RgbaImage::from_raw(
            bitmap.width() as u32,
            bitmap.height() as u32,
            bitmap.as_rgba_bytes(),
        )
        .ok_or_else(|| render_error("bitmap size does not match its pixel data".to_string()))
    }

    /// Metadata title, falling back to the file name.
    fn title(&self) -> Option<String> {
        self.inner
            .metadata()
            .get(PdfDocumentMetadataTagType::Title)
            .map(|tag| tag.value().trim().to_string())
            .filter(|title| !title.is_empty())
            .or_else(|| {
                self.path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
    }
}
