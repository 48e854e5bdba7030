//! Device-context clip state.
//!
//! A [`ClipContext`] keeps two regions. The logical clip region is what the
//! caller selects, in coordinates local to the device origin. The effective
//! region is derived from it after every change: translated to device
//! coordinates, intersected with the device rectangle and, when one is set,
//! with the visible region handed down by the window stack. Drawing only ever
//! consults the effective region.

use log::debug;
use region_core::{ClipRectHeap, ClipRegion, Rect, RegionKind};

use crate::error::{Result, SurfaceError};

/// How `select_clip_region_mode` combines the new region with the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipMode {
    /// Replace the clip region.
    Copy,
    /// Keep the intersection.
    And,
    /// Keep the union.
    Or,
    /// Remove the given region.
    Diff,
    /// Keep pixels in exactly one of the two.
    Xor,
}

pub struct ClipContext {
    device: Rect,
    clip: ClipRegion,
    visible: Option<ClipRegion>,
    effective: ClipRegion,
}

fn local_rect(device: Rect) -> Rect {
    Rect::new(0, 0, device.width(), device.height())
}

/// Normalize a caller rect, `None` when nothing is left of it.
fn usable(rect: Rect) -> Option<Rect> {
    let rect = rect.normalized();
    (!rect.is_empty()).then_some(rect)
}

/// Logical clip covering the whole of `device`.
fn full_clip(heap: &ClipRectHeap, device: Rect) -> Result<ClipRegion> {
    let mut clip = ClipRegion::new(heap);
    clip.set_rect(local_rect(device))?;
    Ok(clip)
}

/// `clip` moved to device coordinates and cut to the device and `visible`.
fn derive_effective(
    clip: &ClipRegion,
    device: Rect,
    visible: Option<&ClipRegion>,
) -> Result<ClipRegion> {
    let mut effective = clip.try_clone()?;
    effective.offset(device.left, device.top);
    effective.intersect_rect(device)?;
    if let Some(visible) = visible {
        effective.intersect_with(visible)?;
    }
    debug!(
        "clip regenerated: {} rects, bound {:?}",
        effective.len(),
        effective.bound()
    );
    Ok(effective)
}

impl ClipContext {
    /// Context covering `device` (in surface coordinates) with no clipping
    /// beyond the device itself.
    pub fn new(heap: &ClipRectHeap, device: Rect) -> Result<Self> {
        let device = device.normalized();
        let clip = full_clip(heap, device)?;
        let effective = derive_effective(&clip, device, None)?;
        Ok(Self { device, clip, visible: None, effective })
    }

    /// Device rectangle in surface coordinates.
    pub fn device(&self) -> Rect {
        self.device
    }

    /// Surface coordinates of the logical origin.
    pub fn origin(&self) -> (i32, i32) {
        (self.device.left, self.device.top)
    }

    /// Move the context onto a new device rectangle. The clip region is reset
    /// to the whole device and any visible region is dropped.
    pub fn set_device(&mut self, device: Rect) -> Result<()> {
        let device = device.normalized();
        let clip = full_clip(self.clip.heap(), device)?;
        let effective = derive_effective(&clip, device, None)?;
        self.device = device;
        self.clip = clip;
        self.visible = None;
        self.effective = effective;
        Ok(())
    }

    /// Restrict drawing to `visible` (surface coordinates), typically the
    /// part of a window not covered by others. `None` lifts the restriction.
    pub fn set_visible_region(&mut self, visible: Option<&ClipRegion>) -> Result<()> {
        let visible = match visible {
            Some(src) => {
                let mut copy = ClipRegion::new(self.clip.heap());
                copy.copy_from(src)?;
                Some(copy)
            }
            None => None,
        };
        self.effective = derive_effective(&self.clip, self.device, visible.as_ref())?;
        self.visible = visible;
        Ok(())
    }

    /// Install `clip` and its effective region together. On error the
    /// context keeps its previous state.
    fn commit(&mut self, clip: ClipRegion) -> Result<()> {
        let effective = derive_effective(&clip, self.device, self.visible.as_ref())?;
        self.clip = clip;
        self.effective = effective;
        Ok(())
    }

    /// Apply `edit` to a copy of the clip region and commit the result.
    fn edit_clip(
        &mut self,
        edit: impl FnOnce(&mut ClipRegion) -> region_core::Result<()>,
    ) -> Result<()> {
        let mut clip = self.clip.try_clone()?;
        edit(&mut clip)?;
        self.commit(clip)
    }

    fn reset(&mut self) -> Result<()> {
        let clip = full_clip(self.clip.heap(), self.device)?;
        self.commit(clip)
    }

    /// Set the clip region to `rect`, or to the whole device for `None`.
    /// Empty rectangles are ignored.
    pub fn select_clip_rect(&mut self, rect: Option<Rect>) -> Result<()> {
        let Some(rect) = rect else {
            return self.reset();
        };
        let Some(rect) = usable(rect) else {
            return Ok(());
        };
        let mut clip = ClipRegion::new(self.clip.heap());
        clip.set_rect(rect)?;
        self.commit(clip)
    }

    /// Replace the clip region with a copy of `region`, or the whole device
    /// for `None`.
    pub fn select_clip_region(&mut self, region: Option<&ClipRegion>) -> Result<()> {
        self.select_clip_region_mode(region, ClipMode::Copy).map(|_| ())
    }

    /// Combine `region` into the clip region and return the resulting kind.
    pub fn select_clip_region_mode(
        &mut self,
        region: Option<&ClipRegion>,
        mode: ClipMode,
    ) -> Result<RegionKind> {
        match (mode, region) {
            (ClipMode::Copy, None) => self.reset()?,
            (ClipMode::Copy, Some(src)) => self.commit(src.try_clone()?)?,
            (_, None) => return Err(SurfaceError::MissingRegion(mode)),
            (ClipMode::And, Some(src)) => self.edit_clip(|clip| clip.intersect_with(src))?,
            (ClipMode::Or, Some(src)) => self.edit_clip(|clip| clip.union_with(src))?,
            (ClipMode::Diff, Some(src)) => self.edit_clip(|clip| clip.subtract_with(src))?,
            (ClipMode::Xor, Some(src)) => self.edit_clip(|clip| clip.xor_with(src))?,
        }
        Ok(self.clip.kind())
    }

    /// Narrow the clip region to `rect`.
    pub fn intersect_clip_rect(&mut self, rect: Rect) -> Result<()> {
        let Some(rect) = usable(rect) else {
            return Ok(());
        };
        self.edit_clip(|clip| clip.intersect_rect(rect))
    }

    /// Remove `rect` from the clip region.
    pub fn exclude_clip_rect(&mut self, rect: Rect) -> Result<()> {
        let Some(rect) = usable(rect) else {
            return Ok(());
        };
        self.edit_clip(|clip| clip.subtract_rect(rect))
    }

    /// Add `rect` to the clip region.
    pub fn include_clip_rect(&mut self, rect: Rect) -> Result<()> {
        let Some(rect) = usable(rect) else {
            return Ok(());
        };
        self.edit_clip(|clip| clip.add_rect(rect))
    }

    pub fn offset_clip_region(&mut self, dx: i32, dy: i32) -> Result<RegionKind> {
        self.edit_clip(|clip| {
            clip.offset(dx, dy);
            Ok(())
        })?;
        Ok(self.clip.kind())
    }

    /// Bound of the clip region limited to the device, in logical coordinates.
    pub fn clip_box(&self) -> Rect {
        self.clip
            .bound()
            .intersection(&local_rect(self.device))
            .unwrap_or(Rect::EMPTY)
    }

    /// Copy the logical clip region into `dst`.
    pub fn clip_region(&self, dst: &mut ClipRegion) -> Result<RegionKind> {
        dst.copy_from(&self.clip)?;
        Ok(dst.kind())
    }

    /// True when the logical point lies in the clip region.
    pub fn pt_visible(&self, x: i32, y: i32) -> bool {
        self.clip.contains_point(x, y)
    }

    /// True when any part of the logical `rect` lies in the clip region.
    pub fn rect_visible(&self, rect: Rect) -> bool {
        self.clip.intersects_rect(&rect.normalized())
    }

    /// Region drawing is restricted to, in surface coordinates.
    pub fn effective_region(&self) -> &ClipRegion {
        &self.effective
    }
}
