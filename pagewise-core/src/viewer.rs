//! Orchestrator tying the display layer to the page manager, zoom and navigation.
//!
//! Holds no rendering or navigation logic of its own. Scroll, resize and key
//! events are translated into calls on the three components; zoom changes
//! become a new render DPI (`base_dpi * factor`) and a re-render of the
//! visible slots; navigation requests are carried out against the owned
//! document and the display.

use crate::backend::{Document, DocumentBackend};
use crate::config::ViewerConfig;
use crate::display::Display;
use crate::error::{Result, ViewerError};
use crate::geometry::{ContentExtent, PageGeometry, PageInfo, ViewportInfo};
use crate::input::{Key, Modifiers};
use crate::navigation::{NavigationContext, NavigationController, NavigationEvent};
use crate::page_manager::PageManager;
use crate::zoom::{ZoomChange, ZoomController, ZoomMode};
use std::path::Path;

/// Notifications for the front end (status bar, window title, toolbar state).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    CurrentPageChanged(usize),
    ZoomChanged { factor: f64, mode: ZoomMode },
}

/// Render resolution for a zoom factor, never below 1 DPI.
pub fn dpi_for_zoom(base_dpi: u32, factor: f64) -> u32 {
    ((f64::from(base_dpi) * factor) as u32).max(1)
}

pub struct Viewer<D, S> {
    config: ViewerConfig,
    display: S,
    document: Option<D>,
    pages: PageManager,
    zoom: ZoomController,
    navigation: NavigationController,
    events: Vec<ViewerEvent>,
}

impl<D: Document, S: Display> Viewer<D, S> {
    pub fn new(config: ViewerConfig, display: S) -> Self {
        Self {
            pages: PageManager::new(&config),
            zoom: ZoomController::new(&config),
            navigation: NavigationController::new(&config),
            config,
            display,
            document: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn display(&self) -> &S {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut S {
        &mut self.display
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn page_manager(&self) -> &PageManager {
        &self.pages
    }

    pub fn zoom_controller(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    pub fn current_page(&self) -> usize {
        self.navigation.current_page()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.factor()
    }

    pub fn zoom_mode(&self) -> ZoomMode {
        self.zoom.mode()
    }

    pub fn is_fit_width(&self) -> bool {
        self.zoom.is_fit_width()
    }

    pub fn is_fit_page(&self) -> bool {
        self.zoom.is_fit_page()
    }

    /// DPI that pages are rendered at for the current zoom factor.
    pub fn render_dpi(&self) -> u32 {
        dpi_for_zoom(self.config.base_dpi, self.zoom.factor())
    }

    /// Drain notifications raised since the last call.
    pub fn take_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Open `path` with `backend` and display it. On failure the current document stays.
    pub fn open<B>(&mut self, backend: &B, path: &Path) -> Result<()>
    where
        B: DocumentBackend<Document = D>,
    {
        let document = backend.open(path).inspect_err(|e| {
            tracing::error!("Failed to open {}: {}", path.display(), e);
        })?;
        self.load_document(document)
    }

    /// Take ownership of `document`, pre-render its first pages and jump to page one.
    ///
    /// A document without pages is rejected and the current one is kept.
    pub fn load_document(&mut self, document: D) -> Result<()> {
        let page_count = document.page_count();
        if page_count == 0 {
            return Err(ViewerError::EmptyDocument);
        }

        self.clear_document();
        self.pages.build(&document);

        let dpi = self.render_dpi();
        self.pages.set_layout_dpi(dpi);
        self.pages
            .pre_render_initial(&document, self.config.initial_prerender, dpi);
        self.navigation.set_render_dpi(dpi);
        self.document = Some(document);
        self.sync_content_size();
        tracing::info!("Loaded document with {} pages", page_count);

        self.navigate(|navigation, context| navigation.go_to_first_page(context));
        Ok(())
    }

    /// Release the document and every rendered page.
    pub fn clear_document(&mut self) {
        self.pages.clear();
        self.document = None;
        self.navigation.reset();
        self.display.set_content_size(ContentExtent::default());
    }

    /// The display's scroll position moved.
    pub fn on_scroll_changed(&mut self) {
        if self.document.is_none() {
            return;
        }
        self.render_visible();
        self.navigate(|navigation, context| navigation.update_from_scroll(context));
    }

    /// The display's viewport was resized.
    pub fn on_resize(&mut self) {
        let viewport = self.viewport_info();
        let page = self.page_info();
        match self.zoom.on_viewport_resize(&viewport, &page) {
            Some(change) => self.apply_zoom_change(change),
            None => self.render_visible(),
        }
    }

    /// Zoom shortcuts first, then page navigation keys. Returns whether the key was used.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        if self.document.is_none() {
            return false;
        }

        if modifiers.control {
            let change = match key {
                Key::Character('+' | '=') => Some(self.zoom.zoom_in()),
                Key::Character('-' | '_') => Some(self.zoom.zoom_out()),
                Key::Character('0') => Some(self.zoom.reset_zoom()),
                _ => None,
            };
            if let Some(change) = change {
                self.handle_zoom(change);
                return true;
            }
        }

        self.navigate(|navigation, context| navigation.handle_key(context, key))
            .unwrap_or(false)
    }

    pub fn go_to_page(&mut self, index: usize) -> bool {
        self.navigate(|navigation, context| navigation.go_to_page(context, index))
            .unwrap_or(false)
    }

    pub fn go_to_next_page(&mut self) -> bool {
        self.navigate(|navigation, context| navigation.go_to_next_page(context))
            .unwrap_or(false)
    }

    pub fn go_to_previous_page(&mut self) -> bool {
        self.navigate(|navigation, context| navigation.go_to_previous_page(context))
            .unwrap_or(false)
    }

    pub fn go_to_first_page(&mut self) -> bool {
        self.navigate(|navigation, context| navigation.go_to_first_page(context))
            .unwrap_or(false)
    }

    pub fn go_to_last_page(&mut self) -> bool {
        self.navigate(|navigation, context| navigation.go_to_last_page(context))
            .unwrap_or(false)
    }

    pub fn set_zoom(&mut self, factor: f64) -> Option<ZoomChange> {
        let change = self.zoom.set_zoom(factor);
        self.handle_zoom(change)
    }

    pub fn zoom_in(&mut self) -> Option<ZoomChange> {
        let change = self.zoom.zoom_in();
        self.handle_zoom(change)
    }

    pub fn zoom_out(&mut self) -> Option<ZoomChange> {
        let change = self.zoom.zoom_out();
        self.handle_zoom(change)
    }

    pub fn zoom_reset(&mut self) -> Option<ZoomChange> {
        let change = self.zoom.reset_zoom();
        self.handle_zoom(change)
    }

    pub fn zoom_fit_width(&mut self) -> Option<ZoomChange> {
        let viewport = self.viewport_info();
        let page = self.page_info();
        let change = self.zoom.fit_to_width(&viewport, &page);
        self.handle_zoom(change)
    }

    pub fn zoom_fit_page(&mut self) -> Option<ZoomChange> {
        let viewport = self.viewport_info();
        let page = self.page_info();
        let change = self.zoom.fit_to_page(&viewport, &page);
        self.handle_zoom(change)
    }

    /// Current viewport with the page column's margins.
    pub fn viewport_info(&self) -> ViewportInfo {
        let size = self.display.viewport_size();
        let margins = self.pages.layout_margins();
        ViewportInfo {
            width: size.width,
            height: size.height,
            margins_h: margins.horizontal(),
            margins_v: margins.vertical(),
        }
    }

    /// First page size at zoom 1.0, so fit factors are absolute rather than
    /// relative to whatever resolution the page was last rendered at.
    pub fn page_info(&self) -> PageInfo {
        self.pages.reference_page(self.config.base_dpi)
    }

    fn handle_zoom(&mut self, change: Option<ZoomChange>) -> Option<ZoomChange> {
        if let Some(change) = change {
            self.apply_zoom_change(change);
        }
        change
    }

    fn apply_zoom_change(&mut self, change: ZoomChange) {
        let dpi = dpi_for_zoom(self.config.base_dpi, change.factor);
        self.navigation.set_render_dpi(dpi);
        if self.pages.set_layout_dpi(dpi) {
            self.sync_content_size();
        }
        self.render_visible();
        self.events.push(ViewerEvent::ZoomChanged {
            factor: change.factor,
            mode: change.mode,
        });
    }

    fn render_visible(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let scroll_offset = self.display.scroll_offset();
        let viewport_height = self.display.viewport_size().height;
        let dpi = dpi_for_zoom(self.config.base_dpi, self.zoom.factor());

        let rendered = self.pages.render_visible(
            document,
            scroll_offset,
            viewport_height,
            self.config.prerender_buffer,
            dpi,
        );
        if rendered > 0 {
            self.sync_content_size();
        }
    }

    fn sync_content_size(&mut self) {
        self.display.set_content_size(self.pages.content_extent());
    }

    /// Run a navigation action against the loaded document. `None` without one.
    ///
    /// A scroll request raised by the action is followed by a regular scroll
    /// pass at the new position before this returns.
    fn navigate<R>(
        &mut self,
        action: impl FnOnce(&mut NavigationController, &mut dyn NavigationContext) -> R,
    ) -> Option<R> {
        let document = self.document.as_ref()?;
        let mut host = NavigationHost {
            document,
            pages: &mut self.pages,
            display: &mut self.display,
            events: &mut self.events,
            scrolled: false,
        };
        let result = action(&mut self.navigation, &mut host);

        if host.scrolled {
            self.on_scroll_changed();
        }
        Some(result)
    }
}

/// Borrowed view of the viewer's parts that navigation acts through.
struct NavigationHost<'a, D, S> {
    document: &'a D,
    pages: &'a mut PageManager,
    display: &'a mut S,
    events: &'a mut Vec<ViewerEvent>,
    scrolled: bool,
}

impl<D: Document, S: Display> NavigationContext for NavigationHost<'_, D, S> {
    fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    fn page_geometry(&self, index: usize) -> Option<PageGeometry> {
        self.pages.page_at(index).and_then(|slot| slot.geometry())
    }

    fn viewport_height(&self) -> u32 {
        self.display.viewport_size().height
    }

    fn scroll_offset(&self) -> u32 {
        self.display.scroll_offset()
    }

    fn notify(&mut self, event: NavigationEvent) {
        match event {
            NavigationEvent::RenderPage { index, dpi } => {
                if self.pages.render_at(self.document, index, dpi) {
                    self.display.set_content_size(self.pages.content_extent());
                }
            }
            NavigationEvent::ScrollTo(offset) => {
                self.display.set_scroll_offset(offset);
                self.scrolled = true;
            }
            NavigationEvent::CurrentPageChanged(index) => {
                self.events.push(ViewerEvent::CurrentPageChanged(index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_scales_with_zoom() {
        assert_eq!(dpi_for_zoom(200, 1.0), 200);
        assert_eq!(dpi_for_zoom(200, 1.5), 300);
        assert_eq!(dpi_for_zoom(200, 0.5), 100);
    }

    #[test]
    fn dpi_never_reaches_zero() {
        assert_eq!(dpi_for_zoom(200, 0.0), 1);
        assert_eq!(dpi_for_zoom(1, 0.25), 1);
    }
}
