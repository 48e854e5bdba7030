//! strata: banded clip regions and clipped software drawing.
//!
//! Facade over the workspace crates:
//! - [`region`]: rectangles, the block heap and the region algebra
//! - [`surface`]: device-context clip state, RGBA surface, window stack
//! - [`config`]: `strata.toml` loading

pub use region_core as region;
pub use strata_config as config;
pub use strata_surface as surface;

pub use region_core::{
    BlockHeap, ClipRectHeap, ClipRegion, Point, Rect, RegionError, RegionKind, RegionOp,
};
pub use strata_surface::{ClipContext, ClipMode, Surface, SurfaceError, WindowStack};
