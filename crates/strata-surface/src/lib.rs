//! strata-surface: clipped software drawing on top of region-core.
//!
//! [`ClipContext`] holds a device context's clip state, [`Surface`] paints
//! into an RGBA image through it and [`WindowStack`] computes the visible
//! region of overlapping windows.

pub mod clip;
mod error;
pub mod shapes;
mod surface;
pub mod windows;

pub use clip::{ClipContext, ClipMode};
pub use error::{Result, SurfaceError};
pub use surface::Surface;
pub use windows::{WindowId, WindowStack};

pub use image::Rgba;
