use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring a PDF into a session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid PDF: {0}")]
    Parse(#[from] lopdf::Error),

    /// Password-protected documents are not supported.
    #[error("encrypted PDFs are not supported")]
    Encrypted,

    #[error("PDF has no pages")]
    NoPages,
}

/// Failure to rasterize a single page. Tolerated per page by the gallery.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page position {position} out of range (page_count={page_count})")]
    OutOfRange { position: usize, page_count: usize },

    #[error("page {position} is corrupt: {reason}")]
    Corrupt { position: usize, reason: String },

    #[cfg_attr(not(feature = "pdfium"), allow(dead_code))]
    #[error("renderer backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("slot {slot} is not shown (slot_count={slot_count})")]
    UnknownSlot { slot: usize, slot_count: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeleteError {
    #[error("document is closed")]
    Closed,

    #[error("page positions must be strictly descending, got {0:?}")]
    NotDescending(Vec<usize>),

    #[error("page position {position} out of range (page_count={page_count})")]
    OutOfRange { position: usize, page_count: usize },

    /// The underlying library left the page in place.
    #[error("page position {0} could not be removed")]
    Unapplied(usize),
}

/// Failure to persist a session. The document stays open and unchanged.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("document is closed")]
    Closed,

    #[error("refusing to save a PDF with no pages")]
    NoPages,

    #[error("failed to serialize PDF: {0}")]
    Serialize(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by [`crate::editor::PageEditor`] operations.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("no pages selected")]
    NothingSelected,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Delete(#[from] DeleteError),
}
