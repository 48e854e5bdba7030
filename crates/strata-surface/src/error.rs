//! Error types for drawing surfaces and window stacks.

use region_core::RegionError;
use thiserror::Error;

use crate::clip::ClipMode;
use crate::windows::WindowId;

/// Result type for surface operations.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Errors that can occur while clipping, drawing or managing windows.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// A clip-region operation could not allocate its nodes.
    #[error("region operation failed: {0}")]
    Region(#[from] RegionError),

    /// Combining modes other than `Copy` need a source region.
    #[error("clip mode {0:?} requires a region")]
    MissingRegion(ClipMode),

    /// The window id is not (or no longer) in the stack.
    #[error("unknown window {0}")]
    UnknownWindow(WindowId),

    /// Surfaces must have a non-zero size.
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Encoding or writing the image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
