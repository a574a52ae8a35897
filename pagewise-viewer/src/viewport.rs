use iced::widget::scrollable;
use pagewise_core::{ContentExtent, Display, ViewportSize};

/// Mirror of the page scrollable's state, as seen by the viewer core.
///
/// Scroll requests from the core are clamped immediately and queued until the
/// application turns them into a `scroll_to` task.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    viewport: ViewportSize,
    offset: u32,
    content: ContentExtent,
    pending_scroll: Option<u32>,
}

impl ScrollState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: ViewportSize { width, height },
            ..Self::default()
        }
    }

    pub fn max_offset(&self) -> u32 {
        self.content.height.saturating_sub(self.viewport.height)
    }

    /// Scroll position requested by the core that the widget has not applied yet.
    pub fn take_pending_scroll(&mut self) -> Option<u32> {
        self.pending_scroll.take()
    }

    /// Take the offset and bounds reported by the widget. Returns whether the
    /// visible area changed size.
    pub fn sync(&mut self, viewport: &scrollable::Viewport) -> bool {
        let bounds = viewport.bounds();
        let size = ViewportSize {
            width: bounds.width.max(0.0) as u32,
            height: bounds.height.max(0.0) as u32,
        };
        self.offset = viewport.absolute_offset().y.max(0.0) as u32;

        let resized = size != self.viewport;
        self.viewport = size;
        resized
    }

    /// Estimate the visible area from a new window size before the widget reports it.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let size = ViewportSize { width, height };
        let resized = size != self.viewport;
        self.viewport = size;
        self.offset = self.offset.min(self.max_offset());
        resized
    }
}

impl Display for ScrollState {
    fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    fn scroll_offset(&self) -> u32 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: u32) {
        self.offset = offset.min(self.max_offset());
        self.pending_scroll = Some(self.offset);
    }

    fn set_content_size(&mut self, extent: ContentExtent) {
        self.content = extent;
        self.offset = self.offset.min(self.max_offset());
    }
}
