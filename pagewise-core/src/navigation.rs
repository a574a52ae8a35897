//! Current-page tracking and page jumps.
//!
//! The controller owns only the current page index and the DPI used for
//! targeted renders. Everything else (page geometry, viewport, scrollbar) is
//! reached through a [`NavigationContext`] supplied per call, and every
//! outward effect is delivered back through [`NavigationContext::notify`].

use crate::config::ViewerConfig;
use crate::geometry::PageGeometry;
use crate::input::Key;

/// Outbound requests and notifications, in the order they are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Make sure `index` is rendered at `dpi` before its geometry is read.
    RenderPage { index: usize, dpi: u32 },
    /// Move the vertical scrollbar to this offset.
    ScrollTo(u32),
    CurrentPageChanged(usize),
}

pub trait NavigationContext {
    fn page_count(&self) -> usize;

    /// Geometry of a page, `None` until it has been rendered.
    fn page_geometry(&self, index: usize) -> Option<PageGeometry>;

    fn viewport_height(&self) -> u32;

    fn scroll_offset(&self) -> u32;

    /// Handle an event synchronously; a `RenderPage` must have taken effect on return.
    fn notify(&mut self, event: NavigationEvent);
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    current_page: usize,
    render_dpi: u32,
}

impl NavigationController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            current_page: 0,
            render_dpi: config.base_dpi,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn render_dpi(&self) -> u32 {
        self.render_dpi
    }

    pub fn set_render_dpi(&mut self, dpi: u32) {
        self.render_dpi = dpi;
    }

    /// Back to the first page, for a newly loaded or closed document.
    pub fn reset(&mut self) {
        self.current_page = 0;
    }

    /// Jump to `index`, centering it vertically when it fits in the viewport.
    ///
    /// Out of range indices are ignored. Returns whether the jump happened.
    pub fn go_to_page<C>(&mut self, context: &mut C, index: usize) -> bool
    where
        C: NavigationContext + ?Sized,
    {
        let page_count = context.page_count();
        if index >= page_count {
            tracing::trace!("Ignoring jump to page {} of {}", index, page_count);
            return false;
        }

        self.current_page = index;
        context.notify(NavigationEvent::RenderPage {
            index,
            dpi: self.render_dpi,
        });

        match context.page_geometry(index) {
            Some(geometry) => {
                let target = centered_scroll_offset(&geometry, context.viewport_height());
                tracing::debug!("Jumping to page {} (scroll {})", index, target);
                context.notify(NavigationEvent::ScrollTo(target));
            }
            None => tracing::debug!("Page {} has no geometry yet, not scrolling", index),
        }

        context.notify(NavigationEvent::CurrentPageChanged(index));
        true
    }

    pub fn go_to_next_page<C>(&mut self, context: &mut C) -> bool
    where
        C: NavigationContext + ?Sized,
    {
        let next = self.current_page + 1;
        next < context.page_count() && self.go_to_page(context, next)
    }

    pub fn go_to_previous_page<C>(&mut self, context: &mut C) -> bool
    where
        C: NavigationContext + ?Sized,
    {
        match self.current_page.checked_sub(1) {
            Some(previous) => self.go_to_page(context, previous),
            None => false,
        }
    }

    pub fn go_to_first_page<C>(&mut self, context: &mut C) -> bool
    where
        C: NavigationContext + ?Sized,
    {
        self.go_to_page(context, 0)
    }

    pub fn go_to_last_page<C>(&mut self, context: &mut C) -> bool
    where
        C: NavigationContext + ?Sized,
    {
        match context.page_count().checked_sub(1) {
            Some(last) => self.go_to_page(context, last),
            None => false,
        }
    }

    /// Re-derive the current page from the page under the viewport's vertical center.
    ///
    /// The first page whose band contains the center wins. When no rendered page
    /// contains it, the current page is left alone. Returns the new page if it changed.
    pub fn update_from_scroll<C>(&mut self, context: &mut C) -> Option<usize>
    where
        C: NavigationContext + ?Sized,
    {
        let page_count = context.page_count();
        if page_count == 0 {
            return None;
        }

        let center = context
            .scroll_offset()
            .saturating_add(context.viewport_height() / 2);
        let found = (0..page_count).find(|&index| {
            context
                .page_geometry(index)
                .is_some_and(|geometry| geometry.contains_y(center))
        })?;

        if found == self.current_page {
            return None;
        }
        self.current_page = found;
        context.notify(NavigationEvent::CurrentPageChanged(found));
        Some(found)
    }

    /// Page navigation keys. Returns whether the key was one of them.
    pub fn handle_key<C>(&mut self, context: &mut C, key: Key) -> bool
    where
        C: NavigationContext + ?Sized,
    {
        match key {
            Key::ArrowRight | Key::ArrowDown | Key::PageDown => {
                self.go_to_next_page(context);
            }
            Key::ArrowLeft | Key::ArrowUp | Key::PageUp => {
                self.go_to_previous_page(context);
            }
            Key::Home => {
                self.go_to_first_page(context);
            }
            Key::End => {
                self.go_to_last_page(context);
            }
            _ => return false,
        }
        true
    }
}

/// Scroll offset that lines the middle of `page` up with the middle of the
/// viewport, clamped at zero for pages near the top of the content.
pub fn centered_scroll_offset(page: &PageGeometry, viewport_height: u32) -> u32 {
    let slack = i64::from(viewport_height) - i64::from(page.height);
    let target = i64::from(page.top) - slack / 2;
    u32::try_from(target.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Fixed page geometry; render requests mark pages as measured.
    struct Pages {
        geometry: Vec<PageGeometry>,
        measured: Vec<bool>,
        viewport_height: u32,
        scroll: u32,
        events: Vec<NavigationEvent>,
    }

    impl Pages {
        fn stacked(count: usize, height: u32, spacing: u32, viewport_height: u32) -> Self {
            let geometry = (0..count as u32)
                .map(|i| PageGeometry {
                    top: 50 + i * (height + spacing),
                    width: 400,
                    height,
                })
                .collect();
            Self {
                geometry,
                measured: vec![true; count],
                viewport_height,
                scroll: 0,
                events: Vec::new(),
            }
        }

        fn unmeasured(mut self) -> Self {
            self.measured.iter_mut().for_each(|m| *m = false);
            self
        }
    }

    impl NavigationContext for Pages {
        fn page_count(&self) -> usize {
            self.geometry.len()
        }

        fn page_geometry(&self, index: usize) -> Option<PageGeometry> {
            self.measured
                .get(index)
                .copied()
                .filter(|&measured| measured)
                .and_then(|_| self.geometry.get(index).copied())
        }

        fn viewport_height(&self) -> u32 {
            self.viewport_height
        }

        fn scroll_offset(&self) -> u32 {
            self.scroll
        }

        fn notify(&mut self, event: NavigationEvent) {
            match event {
                NavigationEvent::RenderPage { index, .. } => self.measured[index] = true,
                NavigationEvent::ScrollTo(offset) => self.scroll = offset,
                NavigationEvent::CurrentPageChanged(_) => {}
            }
            self.events.push(event);
        }
    }

    fn navigation() -> NavigationController {
        NavigationController::new(&ViewerConfig::default())
    }

    #[test]
    fn jump_renders_centers_then_notifies() {
        let mut pages = Pages::stacked(5, 200, 20, 400);
        let mut nav = navigation();

        assert!(nav.go_to_page(&mut pages, 3));
        // Page 3 top is 50 + 3 * 220 = 710; (400 - 200) / 2 = 100 above it.
        assert_eq!(
            pages.events,
            vec![
                NavigationEvent::RenderPage { index: 3, dpi: 200 },
                NavigationEvent::ScrollTo(610),
                NavigationEvent::CurrentPageChanged(3),
            ]
        );
        assert_eq!(nav.current_page(), 3);
    }

    #[test]
    fn jump_uses_current_render_dpi() {
        let mut pages = Pages::stacked(2, 200, 20, 400);
        let mut nav = navigation();
        nav.set_render_dpi(300);

        nav.go_to_page(&mut pages, 1);
        assert_eq!(
            pages.events[0],
            NavigationEvent::RenderPage { index: 1, dpi: 300 }
        );
    }

    #[test]
    fn centering_is_clamped_at_zero_and_applies_to_tall_pages() {
        let page = PageGeometry {
            top: 500,
            width: 400,
            height: 1000,
        };
        assert_eq!(centered_scroll_offset(&page, 400), 800);

        let first = PageGeometry {
            top: 50,
            width: 400,
            height: 100,
        };
        assert_eq!(centered_scroll_offset(&first, 800), 0);
    }

    #[test]
    fn out_of_range_jump_changes_nothing() {
        let mut pages = Pages::stacked(3, 200, 20, 400);
        let mut nav = navigation();
        nav.go_to_page(&mut pages, 1);
        pages.events.clear();

        assert!(!nav.go_to_page(&mut pages, 3));
        assert!(!nav.go_to_page(&mut pages, usize::MAX));
        assert!(pages.events.is_empty());
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn jump_without_geometry_still_requests_render() {
        // The context here never measures, so geometry stays unknown.
        struct Blind(Vec<NavigationEvent>);
        impl NavigationContext for Blind {
            fn page_count(&self) -> usize {
                4
            }
            fn page_geometry(&self, _: usize) -> Option<PageGeometry> {
                None
            }
            fn viewport_height(&self) -> u32 {
                400
            }
            fn scroll_offset(&self) -> u32 {
                0
            }
            fn notify(&mut self, event: NavigationEvent) {
                self.0.push(event);
            }
        }

        let mut context = Blind(Vec::new());
        let mut nav = navigation();
        assert!(nav.go_to_page(&mut context, 2));
        assert_eq!(
            context.0,
            vec![
                NavigationEvent::RenderPage { index: 2, dpi: 200 },
                NavigationEvent::CurrentPageChanged(2),
            ]
        );
    }

    #[test]
    fn render_request_makes_geometry_available_for_scroll() {
        let mut pages = Pages::stacked(3, 200, 20, 400).unmeasured();
        let mut nav = navigation();

        nav.go_to_page(&mut pages, 2);
        assert!(pages.events.contains(&NavigationEvent::ScrollTo(390)));
    }

    #[test]
    fn scroll_derives_page_under_viewport_center() {
        let mut pages = Pages::stacked(5, 200, 20, 400);
        let mut nav = navigation();

        // Center at 290 + 200 = 490, the top edge of page 2 [490, 690].
        pages.scroll = 290;
        assert_eq!(nav.update_from_scroll(&mut pages), Some(2));
        assert_eq!(pages.events, vec![NavigationEvent::CurrentPageChanged(2)]);

        // Same page again: silent.
        pages.scroll = 300;
        assert_eq!(nav.update_from_scroll(&mut pages), None);
        assert_eq!(pages.events.len(), 1);
    }

    #[test]
    fn center_in_gap_keeps_current_page() {
        let mut pages = Pages::stacked(3, 200, 20, 400);
        let mut nav = navigation();
        nav.go_to_page(&mut pages, 1);
        pages.events.clear();

        // Center at 260 falls between page 0 [50, 250] and page 1 [270, 470].
        pages.scroll = 60;
        assert_eq!(nav.update_from_scroll(&mut pages), None);
        assert_eq!(nav.current_page(), 1);
        assert!(pages.events.is_empty());
    }

    #[test]
    fn shared_boundary_resolves_to_lower_page() {
        let mut pages = Pages::stacked(3, 200, 0, 400);
        let mut nav = navigation();
        nav.go_to_page(&mut pages, 2);

        // Center exactly at 250: bottom of page 0 and top of page 1.
        pages.scroll = 50;
        assert_eq!(nav.update_from_scroll(&mut pages), Some(0));
    }

    #[test]
    fn scroll_with_no_measured_pages_keeps_current_page() {
        let mut pages = Pages::stacked(3, 200, 20, 400).unmeasured();
        let mut nav = navigation();

        pages.scroll = 500;
        assert_eq!(nav.update_from_scroll(&mut pages), None);
        assert_eq!(nav.current_page(), 0);
    }

    #[test]
    fn next_page_stops_at_last_page() {
        let mut pages = Pages::stacked(3, 200, 20, 400);
        let mut nav = navigation();

        assert!(nav.go_to_next_page(&mut pages));
        assert!(nav.go_to_next_page(&mut pages));
        assert!(!nav.go_to_next_page(&mut pages));
        assert_eq!(nav.current_page(), 2);
    }

    #[test]
    fn previous_page_stops_at_first_page() {
        let mut pages = Pages::stacked(3, 200, 20, 400);
        let mut nav = navigation();

        assert!(!nav.go_to_previous_page(&mut pages));
        assert!(pages.events.is_empty());
    }

    #[test]
    fn keys_map_to_page_moves() {
        let mut pages = Pages::stacked(4, 200, 20, 400);
        let mut nav = navigation();

        assert!(nav.handle_key(&mut pages, Key::End));
        assert_eq!(nav.current_page(), 3);
        assert!(nav.handle_key(&mut pages, Key::ArrowUp));
        assert!(nav.handle_key(&mut pages, Key::PageUp));
        assert_eq!(nav.current_page(), 1);
        assert!(nav.handle_key(&mut pages, Key::PageDown));
        assert_eq!(nav.current_page(), 2);
        assert!(nav.handle_key(&mut pages, Key::Home));
        assert_eq!(nav.current_page(), 0);
        assert!(nav.handle_key(&mut pages, Key::ArrowLeft));
        assert_eq!(nav.current_page(), 0);
        assert!(nav.handle_key(&mut pages, Key::ArrowRight));
        assert_eq!(nav.current_page(), 1);
        assert!(nav.handle_key(&mut pages, Key::ArrowDown));
        assert_eq!(nav.current_page(), 2);
    }

    #[test]
    fn other_keys_are_not_handled() {
        let mut pages = Pages::stacked(2, 200, 20, 400);
        let mut nav = navigation();

        assert!(!nav.handle_key(&mut pages, Key::Character('j')));
        assert!(!nav.handle_key(&mut pages, Key::Other));
        assert!(pages.events.is_empty());
    }
}
