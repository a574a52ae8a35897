use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a document backend.
///
/// Backends return these as values; nothing crosses the backend boundary as a panic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("failed to open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("{} is password protected", path.display())]
    Locked { path: PathBuf },

    #[error("page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("failed to render page {index}: {reason}")]
    Render { index: usize, reason: String },
}

/// Degenerate input to a fit calculation.
///
/// The stateful zoom operations swallow these and keep the previous factor;
/// the pure calculators surface them so callers can tell them apart from
/// "factor already optimal".
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ZoomError {
    #[error("reference page has no usable size ({width}x{height})")]
    DegeneratePage { width: u32, height: u32 },

    #[error("viewport leaves no room for the page ({available_width}x{available_height})")]
    DegenerateViewport {
        available_width: i64,
        available_height: i64,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewerError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("document has no pages")]
    EmptyDocument,
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
