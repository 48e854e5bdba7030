//! Error types for region and block heap operations.

use thiserror::Error;

/// Result type for region operations.
pub type Result<T> = std::result::Result<T, RegionError>;

/// Errors that can occur while allocating clip-rect nodes.
///
/// Allocation is the only failure mode of the engine. A failed operation
/// never modifies its destination region.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
    /// The arena reservation or the general-allocator fallback failed.
    #[error("out of memory while allocating clip rect blocks")]
    OutOfMemory,

    /// The arena is exhausted and the configured overflow budget is used up.
    #[error("block heap overflow limit of {limit} blocks reached")]
    OverflowLimit { limit: usize },
}

impl From<std::collections::TryReserveError> for RegionError {
    fn from(_: std::collections::TryReserveError) -> Self {
        RegionError::OutOfMemory
    }
}
