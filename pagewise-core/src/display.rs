use crate::geometry::ContentExtent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// The scrollable display area the viewer draws into.
///
/// Implemented by the windowing layer. The core reads the viewport and scroll
/// position from it, asks it to scroll, and tells it how large the content is.
/// Events (scroll, resize, keys) flow the other way, into [`crate::Viewer`].
pub trait Display {
    fn viewport_size(&self) -> ViewportSize;

    fn scroll_offset(&self) -> u32;

    fn set_scroll_offset(&mut self, offset: u32);

    fn set_content_size(&mut self, extent: ContentExtent);
}
