//! Z-ordered top-level windows on a screen.
//!
//! The stack answers the question a window manager asks before every paint:
//! which part of this window is actually on screen? That is the window
//! rectangle clipped to the screen, minus every window stacked above it.

use std::fmt;

use log::{debug, trace};
use region_core::{ClipRectHeap, ClipRegion, Rect};

use crate::error::{Result, SurfaceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Window {
    id: WindowId,
    rect: Rect,
}

pub struct WindowStack {
    screen: Rect,
    heap: ClipRectHeap,
    /// Bottom to top.
    windows: Vec<Window>,
    next_id: u32,
}

impl WindowStack {
    pub fn new(heap: &ClipRectHeap, screen: Rect) -> Self {
        Self { screen: screen.normalized(), heap: heap.clone(), windows: Vec::new(), next_id: 1 }
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Window ids from bottom to top.
    pub fn ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.iter().map(|w| w.id)
    }

    fn position(&self, id: WindowId) -> Result<usize> {
        self.windows
            .iter()
            .position(|w| w.id == id)
            .ok_or(SurfaceError::UnknownWindow(id))
    }

    /// Add a window on top of the stack.
    pub fn create(&mut self, rect: Rect) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.windows.push(Window { id, rect: rect.normalized() });
        debug!("created window {} at {:?}", id, rect);
        id
    }

    pub fn rect(&self, id: WindowId) -> Result<Rect> {
        Ok(self.windows[self.position(id)?].rect)
    }

    /// Remove a window and return its last rectangle.
    pub fn remove(&mut self, id: WindowId) -> Result<Rect> {
        let idx = self.position(id)?;
        Ok(self.windows.remove(idx).rect)
    }

    /// Move a window to the top of the stack.
    pub fn raise(&mut self, id: WindowId) -> Result<()> {
        let idx = self.position(id)?;
        let win = self.windows.remove(idx);
        self.windows.push(win);
        Ok(())
    }

    /// Move a window so its top-left corner is at (`x`, `y`).
    pub fn move_to(&mut self, id: WindowId, x: i32, y: i32) -> Result<()> {
        let idx = self.position(id)?;
        let r = self.windows[idx].rect;
        self.windows[idx].rect = Rect::from_xywh(x, y, r.width(), r.height());
        Ok(())
    }

    pub fn resize(&mut self, id: WindowId, width: i32, height: i32) -> Result<()> {
        let idx = self.position(id)?;
        let r = self.windows[idx].rect;
        self.windows[idx].rect = Rect::from_xywh(r.left, r.top, width.max(0), height.max(0));
        Ok(())
    }

    /// Topmost window containing the screen point, if any.
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        if !self.screen.contains(x, y) {
            return None;
        }
        self.windows.iter().rev().find(|w| w.rect.contains(x, y)).map(|w| w.id)
    }

    /// On-screen part of the window not covered by windows above it.
    pub fn visible_region(&self, id: WindowId) -> Result<ClipRegion> {
        let idx = self.position(id)?;
        let mut rgn = ClipRegion::new(&self.heap);
        if let Some(on_screen) = self.windows[idx].rect.intersection(&self.screen) {
            rgn.set_rect(on_screen)?;
        }
        for above in &self.windows[idx + 1..] {
            if rgn.is_empty() {
                break;
            }
            rgn.subtract_rect(above.rect)?;
        }
        trace!("visible region of {}: {:?}", id, rgn);
        Ok(rgn)
    }

    /// Visible regions of every window, bottom to top.
    pub fn visible_regions(&self) -> Result<Vec<(WindowId, ClipRegion)>> {
        self.windows
            .iter()
            .map(|w| Ok((w.id, self.visible_region(w.id)?)))
            .collect()
    }

    /// Screen area not covered by any window.
    pub fn desktop_region(&self) -> Result<ClipRegion> {
        let mut rgn = ClipRegion::new(&self.heap);
        rgn.set_rect(self.screen)?;
        for w in &self.windows {
            rgn.subtract_rect(w.rect)?;
        }
        Ok(rgn)
    }
}
