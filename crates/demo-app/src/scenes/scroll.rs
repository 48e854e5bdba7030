use anyhow::Result;
use region_core::{ClipRectHeap, ClipRegion, Rect};
use strata_surface::{Rgba, Surface};

use super::Scene;

/// An invalid region scrolled inside a viewport, drawn before and after.
pub struct ScrollScene {
    dx: i32,
    dy: i32,
}

impl Default for ScrollScene {
    fn default() -> Self {
        Self { dx: 0, dy: -40 }
    }
}

impl Scene for ScrollScene {
    fn name(&self) -> &'static str {
        "scroll"
    }

    fn render(&mut self, surface: &mut Surface, heap: &ClipRectHeap) -> Result<()> {
        let screen = surface.bounds();
        let half = screen.width() / 2;
        let client = Rect::new(0, 0, half, screen.height()).inflate(-8, -8);
        let viewport = Rect::new(client.left, client.top + 40, client.right, client.bottom - 40);

        let mut invalid = ClipRegion::new(heap);
        for k in 0..6 {
            let left = client.left + 12 + k * 30;
            invalid.add_rect(Rect::from_xywh(left, client.top + k * 50, 80, 36))?;
        }

        let frame = Rgba([200, 200, 200, 255]);
        let before = Rgba([214, 96, 77, 255]);
        let after = Rgba([94, 160, 92, 255]);

        surface.fill_rect(viewport.inflate(1, 1), frame);
        surface.fill_rect(viewport, Rgba([40, 40, 44, 255]));
        surface.fill_region(&invalid, before)?;

        invalid.scroll_within(client, viewport, self.dx, self.dy)?;
        log::info!("scrolled invalid region: {} rects, bound {:?}", invalid.len(), invalid.bound());

        invalid.offset(half, 0);
        let shifted = viewport.offset(half, 0);
        surface.fill_rect(shifted.inflate(1, 1), frame);
        surface.fill_rect(shifted, Rgba([40, 40, 44, 255]));
        surface.fill_region(&invalid, after)?;
        Ok(())
    }
}
