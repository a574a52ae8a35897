//! Viewport-driven incremental rendering for paginated documents.
//!
//! Only the pages on or near screen are rasterized. [`PageManager`] owns the
//! per-page slots and renders the estimated visible range, [`ZoomController`]
//! owns the zoom factor and auto-fit modes, [`NavigationController`] keeps a
//! single current page in step with jumps and scrolling, and [`Viewer`] wires
//! display events into all three.
//!
//! Parsing and rasterizing are delegated to a [`DocumentBackend`]; the window
//! and scrollbar are reached through [`Display`]. Everything runs on the
//! caller's thread, one event at a time.

pub mod backend;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod input;
pub mod navigation;
pub mod page_manager;
pub mod viewer;
pub mod zoom;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use backend::{Document, DocumentBackend, PageSize};
pub use config::ViewerConfig;
pub use display::{Display, ViewportSize};
pub use error::{BackendError, ConfigError, Result, ViewerError, ZoomError};
pub use geometry::{ContentExtent, Margins, PageGeometry, PageInfo, ViewportInfo};
pub use input::{Key, Modifiers};
pub use navigation::{NavigationContext, NavigationController, NavigationEvent};
pub use page_manager::{PageManager, PageSlot};
pub use viewer::{Viewer, ViewerEvent};
pub use zoom::{ZoomChange, ZoomController, ZoomMode};
