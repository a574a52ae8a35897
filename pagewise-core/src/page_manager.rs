//! Page slots, lazy rendering and content layout.
//!
//! One [`PageSlot`] exists per document page, stacked vertically with a fixed
//! spacing inside a fixed outer margin. Slots are rendered only when they fall
//! inside the estimated visible range (or are asked for explicitly), and a slot
//! that is already current at the requested DPI is never rendered again.
//!
//! Unrendered slots still occupy their page's size at the layout DPI, so a
//! render only moves later pages when the image differs from that size.

use crate::backend::{Document, PageSize};
use crate::config::ViewerConfig;
use crate::geometry::{ContentExtent, Margins, PageGeometry, PageInfo};
use image::RgbaImage;
use std::ops::RangeInclusive;

/// Per-page render state.
///
/// `rendered` implies `geometry` is set, matches the pixel size of `image`
/// and equals `layout`.
#[derive(Debug, Clone)]
pub struct PageSlot {
    page_index: usize,
    page_size: Option<PageSize>,
    layout: PageGeometry,
    geometry: Option<PageGeometry>,
    rendered: bool,
    last_rendered_dpi: Option<u32>,
    image: Option<RgbaImage>,
}

impl PageSlot {
    fn new(page_index: usize, page_size: Option<PageSize>) -> Self {
        Self {
            page_index,
            page_size,
            layout: PageGeometry::default(),
            geometry: None,
            rendered: false,
            last_rendered_dpi: None,
            image: None,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn geometry(&self) -> Option<PageGeometry> {
        self.geometry
    }

    /// Box the slot occupies in the page column, rendered or not.
    pub fn layout(&self) -> PageGeometry {
        self.layout
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn last_rendered_dpi(&self) -> Option<u32> {
        self.last_rendered_dpi
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Rendered, and at exactly this resolution.
    pub fn is_current_at(&self, dpi: u32) -> bool {
        self.rendered && self.last_rendered_dpi == Some(dpi)
    }
}

#[derive(Debug)]
pub struct PageManager {
    slots: Vec<PageSlot>,
    spacing: u32,
    margins: Margins,
    average_page_height: u32,
    layout_dpi: u32,
    extent: ContentExtent,
}

impl PageManager {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            slots: Vec::new(),
            spacing: config.page_spacing,
            margins: Margins::uniform(config.page_margin),
            average_page_height: config.average_page_height.max(1),
            layout_dpi: config.base_dpi.max(1),
            extent: ContentExtent::default(),
        }
    }

    /// Replace all slots with one fresh slot per page of `document`.
    ///
    /// A document without pages leaves the manager empty.
    pub fn build<D: Document + ?Sized>(&mut self, document: &D) {
        self.clear();

        let page_count = document.page_count();
        if page_count == 0 {
            tracing::warn!("PageManager: document has no pages");
            return;
        }

        self.slots = (0..page_count)
            .map(|index| match document.page_size(index) {
                Ok(size) => PageSlot::new(index, Some(size)),
                Err(e) => {
                    tracing::warn!("PageManager: no size for page {}: {}", index, e);
                    PageSlot::new(index, None)
                }
            })
            .collect();
        self.recompute_content_extent();
        tracing::debug!("PageManager: built {} page slots", page_count);
    }

    /// Drop every slot and cached image. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.extent = ContentExtent::default();
    }

    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn page_at(&self, index: usize) -> Option<&PageSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.slots
    }

    pub fn content_extent(&self) -> ContentExtent {
        self.extent
    }

    pub fn layout_spacing(&self) -> u32 {
        self.spacing
    }

    pub fn layout_margins(&self) -> Margins {
        self.margins
    }

    pub fn set_layout_spacing(&mut self, spacing: u32) {
        self.spacing = spacing;
        self.recompute_content_extent();
    }

    pub fn set_layout_margins(&mut self, margins: Margins) {
        self.margins = margins;
        self.recompute_content_extent();
    }

    pub fn layout_dpi(&self) -> u32 {
        self.layout_dpi
    }

    /// Resolution unrendered slots are sized at. Returns whether it changed.
    pub fn set_layout_dpi(&mut self, dpi: u32) -> bool {
        let dpi = dpi.max(1);
        if dpi == self.layout_dpi {
            return false;
        }
        self.layout_dpi = dpi;
        self.recompute_content_extent();
        true
    }

    /// Size the first page would have at `dpi`, scaled from its last render.
    ///
    /// Zero until the first page has been rendered.
    pub fn reference_page(&self, dpi: u32) -> PageInfo {
        let Some(slot) = self.slots.first().filter(|slot| slot.rendered) else {
            return PageInfo::default();
        };
        let (Some(geometry), Some(rendered_dpi)) = (slot.geometry, slot.last_rendered_dpi) else {
            return PageInfo::default();
        };
        let scale = f64::from(dpi) / f64::from(rendered_dpi.max(1));
        PageInfo {
            width: (f64::from(geometry.width) * scale).round() as u32,
            height: (f64::from(geometry.height) * scale).round() as u32,
        }
    }

    /// Estimated range of slots on or near screen, buffer included.
    ///
    /// Uses the configured average page height rather than the layout, so the
    /// estimate needs no page sizes at all. `None` when the estimate lies
    /// entirely past the last page or there are no pages.
    pub fn visible_range(
        &self,
        scroll_offset: u32,
        viewport_height: u32,
        buffer: usize,
    ) -> Option<RangeInclusive<usize>> {
        let last_page = self.slots.len().checked_sub(1)?;
        let average = u64::from(self.average_page_height);
        let top = u64::from(scroll_offset);
        let bottom = top + u64::from(viewport_height);

        let first = usize::try_from(top / average)
            .unwrap_or(usize::MAX)
            .saturating_sub(buffer);
        let last = usize::try_from(bottom / average)
            .unwrap_or(usize::MAX)
            .saturating_add(buffer)
            .min(last_page);

        (first <= last).then_some(first..=last)
    }

    /// Render the first `count` slots regardless of visibility.
    pub fn pre_render_initial<D: Document + ?Sized>(
        &mut self,
        document: &D,
        count: usize,
        dpi: u32,
    ) -> usize {
        let pages_to_render = count.min(self.slots.len());
        let rendered = (0..pages_to_render)
            .filter(|&index| self.render_slot(document, index, dpi))
            .count();
        self.recompute_content_extent();
        rendered
    }

    /// Render every slot in the visible range that is not already current at `dpi`.
    ///
    /// Returns how many slots were rendered by this pass.
    pub fn render_visible<D: Document + ?Sized>(
        &mut self,
        document: &D,
        scroll_offset: u32,
        viewport_height: u32,
        buffer: usize,
        dpi: u32,
    ) -> usize {
        let Some(range) = self.visible_range(scroll_offset, viewport_height, buffer) else {
            return 0;
        };

        let rendered = range
            .filter(|&index| self.render_slot(document, index, dpi))
            .count();
        if rendered > 0 {
            self.recompute_content_extent();
        }
        rendered
    }

    /// Render exactly one slot. Returns whether anything was rendered.
    pub fn render_at<D: Document + ?Sized>(&mut self, document: &D, index: usize, dpi: u32) -> bool {
        let rendered = self.render_slot(document, index, dpi);
        if rendered {
            self.recompute_content_extent();
        }
        rendered
    }

    /// Lay the slots out top to bottom and return the resulting scrollable size.
    ///
    /// Rendered slots take their image size. Unrendered slots take their page
    /// size at the layout DPI, or the average page height when the page size
    /// is unknown.
    pub fn recompute_content_extent(&mut self) -> ContentExtent {
        if self.slots.is_empty() {
            self.extent = ContentExtent::default();
            return self.extent;
        }

        let mut y = self.margins.top;
        let mut max_width = 0;
        for (position, slot) in self.slots.iter_mut().enumerate() {
            if position > 0 {
                y = y.saturating_add(self.spacing);
            }
            let (width, height) = match (slot.geometry, slot.page_size) {
                (Some(geometry), _) => (geometry.width, geometry.height),
                (None, Some(size)) => size.to_pixels(self.layout_dpi),
                (None, None) => (0, self.average_page_height),
            };
            slot.layout = PageGeometry {
                top: y,
                width,
                height,
            };
            if let Some(geometry) = slot.geometry.as_mut() {
                geometry.top = y;
            }
            y = y.saturating_add(height);
            max_width = max_width.max(width);
        }

        self.extent = ContentExtent {
            width: max_width.saturating_add(self.margins.horizontal()),
            height: y.saturating_add(self.margins.bottom),
        };
        self.extent
    }

    fn render_slot<D: Document + ?Sized>(&mut self, document: &D, index: usize, dpi: u32) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };

        if slot.is_current_at(dpi) {
            tracing::trace!("Page {} already rendered at {} DPI, skipping", index, dpi);
            return false;
        }

        tracing::debug!("Rendering page {} at {} DPI", index, dpi);
        match document.render_page(slot.page_index, dpi, dpi) {
            Ok(image) => {
                let top = slot.layout.top;
                slot.geometry = Some(PageGeometry {
                    top,
                    width: image.width(),
                    height: image.height(),
                });
                tracing::debug!(
                    "Rendered page {} ({}x{})",
                    index,
                    image.width(),
                    image.height()
                );
                slot.image = Some(image);
                slot.rendered = true;
                slot.last_rendered_dpi = Some(dpi);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to render page {}: {}", index, e);
                false
            }
        }
    }
}
