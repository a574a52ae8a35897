//! In-memory document backend and display used by the test suites.

use crate::backend::{Document, DocumentBackend, PageSize};
use crate::display::{Display, ViewportSize};
use crate::error::BackendError;
use crate::geometry::ContentExtent;
use image::RgbaImage;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A document whose pages render to blank buffers sized from their point size.
///
/// Every backend render call is recorded so tests can assert on redundant work.
#[derive(Debug, Clone)]
pub struct FakeDocument {
    pages: Vec<PageSize>,
    failing: RefCell<HashSet<usize>>,
    render_calls: RefCell<Vec<(usize, u32)>>,
    title: Option<String>,
}

impl FakeDocument {
    pub fn uniform(count: usize, width: f32, height: f32) -> Self {
        Self::with_pages(vec![PageSize { width, height }; count])
    }

    pub fn with_pages(pages: Vec<PageSize>) -> Self {
        Self {
            pages,
            failing: RefCell::new(HashSet::new()),
            render_calls: RefCell::new(Vec::new()),
            title: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Make every render of `index` fail until [`FakeDocument::heal_page`] is called.
    pub fn fail_page(&self, index: usize) {
        self.failing.borrow_mut().insert(index);
    }

    pub fn heal_page(&self, index: usize) {
        self.failing.borrow_mut().remove(&index);
    }

    /// Successful and failed render calls, in order, as `(page, dpi)`.
    pub fn render_calls(&self) -> Vec<(usize, u32)> {
        self.render_calls.borrow().clone()
    }

    pub fn render_count(&self, index: usize) -> usize {
        self.render_calls
            .borrow()
            .iter()
            .filter(|(page, _)| *page == index)
            .count()
    }

    pub fn total_renders(&self) -> usize {
        self.render_calls.borrow().len()
    }
}

impl Document for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> Result<PageSize, BackendError> {
        self.pages
            .get(index)
            .copied()
            .ok_or(BackendError::PageOutOfRange {
                index,
                count: self.pages.len(),
            })
    }

    fn render_page(
        &self,
        index: usize,
        horizontal_dpi: u32,
        vertical_dpi: u32,
    ) -> Result<RgbaImage, BackendError> {
        let size = self.page_size(index)?;
        self.render_calls.borrow_mut().push((index, horizontal_dpi));

        if self.failing.borrow().contains(&index) {
            return Err(BackendError::Render {
                index,
                reason: "injected failure".to_string(),
            });
        }

        let (width, _) = size.to_pixels(horizontal_dpi);
        let (_, height) = size.to_pixels(vertical_dpi);
        Ok(RgbaImage::new(width, height))
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    documents: HashMap<PathBuf, FakeDocument>,
    locked: HashSet<PathBuf>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, document: FakeDocument) -> Self {
        self.documents.insert(path.into(), document);
        self
    }

    pub fn with_locked(mut self, path: impl Into<PathBuf>) -> Self {
        self.locked.insert(path.into());
        self
    }
}

impl DocumentBackend for FakeBackend {
    type Document = FakeDocument;

    fn open(&self, path: &Path) -> Result<FakeDocument, BackendError> {
        if self.locked.contains(path) {
            return Err(BackendError::Locked {
                path: path.to_path_buf(),
            });
        }
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::Open {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            })
    }
}

/// A scroll area that clamps its offset to the content, like a real scrollbar.
#[derive(Debug, Default)]
pub struct FakeDisplay {
    pub viewport: ViewportSize,
    pub scroll: u32,
    pub content: ContentExtent,
    /// Offsets requested through [`Display::set_scroll_offset`], before clamping.
    pub scroll_requests: Vec<u32>,
}

impl FakeDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: ViewportSize { width, height },
            ..Self::default()
        }
    }

    pub fn max_scroll(&self) -> u32 {
        self.content.height.saturating_sub(self.viewport.height)
    }

    /// Move the scrollbar as the user would, without recording a request.
    pub fn user_scroll(&mut self, offset: u32) {
        self.scroll = offset.min(self.max_scroll());
    }
}

impl Display for FakeDisplay {
    fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    fn scroll_offset(&self) -> u32 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_requests.push(offset);
        self.scroll = offset.min(self.max_scroll());
    }

    fn set_content_size(&mut self, extent: ContentExtent) {
        self.content = extent;
        self.scroll = self.scroll.min(self.max_scroll());
    }
}
