/// Error taxonomy for the overlay engine
///
/// Every public operation returns `GalleryResult`; expected failure paths
/// (a catalog miss, an unwritable side-state document) come back as values,
/// never as panics. A missing thumbnail is not an error at all, just a
/// `None` the caller must tolerate.

use thiserror::Error;

/// Result alias used throughout the crate
pub type GalleryResult<T> = Result<T, GalleryError>;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// A query or delete against the external media catalog failed.
    /// Surfaced verbatim to the caller; never retried internally.
    #[error("catalog access failed: {0}")]
    CatalogAccess(String),

    /// A mutation was requested with an unusable identifier.
    /// Rejected before any I/O happens.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Local overlay storage (a side-state document or the thumbnail
    /// scratch directory) could not be prepared or written.
    /// (Unreadable documents never error; they degrade to empty.)
    #[error("side-state storage failed: {0}")]
    SideState(String),

    /// A background worker was cancelled or panicked before completing.
    #[error("background task failed: {0}")]
    Worker(String),
}

impl From<rusqlite::Error> for GalleryError {
    fn from(e: rusqlite::Error) -> Self {
        GalleryError::CatalogAccess(e.to_string())
    }
}
