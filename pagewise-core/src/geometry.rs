//! Plain geometry records shared by the page manager, zoom and navigation.

/// Placement of a page inside the scrollable content, in viewport pixels.
///
/// Edges saturate at `u32::MAX` rather than wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageGeometry {
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl PageGeometry {
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// Inclusive on both edges, so a point on a shared boundary matches the upper page first.
    pub fn contains_y(&self, y: u32) -> bool {
        y >= self.top && y <= self.bottom()
    }
}

/// Total scrollable size of the laid out pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentExtent {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Margins {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Margins {
    pub fn uniform(value: u32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }
}

/// Snapshot of the visible display area at the moment of a query.
///
/// Never cached across frames; rebuild it from the display on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportInfo {
    pub width: u32,
    pub height: u32,
    pub margins_h: u32,
    pub margins_v: u32,
}

impl ViewportInfo {
    pub fn available_width(&self) -> i64 {
        i64::from(self.width) - i64::from(self.margins_h)
    }

    pub fn available_height(&self) -> i64 {
        i64::from(self.height) - i64::from(self.margins_v)
    }
}

/// Reference page dimensions for fit calculations. Zero until a page has been rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub width: u32,
    pub height: u32,
}
