//! region-core: banded clip regions, their boolean algebra and the block heap
//! that backs their nodes.
//!
//! Regions are sets of pixels stored as y-x-banded rectangle lists. Every
//! mutating operation returns [`Result`]; allocation failure is the only
//! error and leaves the destination untouched.

pub mod block_heap;
pub mod error;
mod ops;
pub mod rect;
pub mod region;
pub mod scanline;

pub use block_heap::{Block, BlockHeap};
pub use error::{RegionError, Result};
pub use ops::RegionOp;
pub use rect::{Point, Rect};
pub use region::{ClipRectHeap, ClipRegion, RegionKind, combine, intersect, subtract, union, xor};
pub use scanline::Span;
