use anyhow::Result;
use log::info;
use region_core::{ClipRectHeap, Point, Rect};
use strata_surface::shapes::{WindowStyle, draw_window};
use strata_surface::{Rgba, Surface, WindowStack};

use super::Scene;

/// Overlapping top-level windows, each painted only through its visible region.
pub struct WindowsScene {
    accents: Vec<Rgba<u8>>,
}

impl Default for WindowsScene {
    fn default() -> Self {
        Self {
            accents: vec![
                Rgba([214, 96, 77, 255]),
                Rgba([94, 160, 92, 255]),
                Rgba([230, 180, 60, 255]),
                Rgba([120, 98, 190, 255]),
            ],
        }
    }
}

impl Scene for WindowsScene {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn render(&mut self, surface: &mut Surface, heap: &ClipRectHeap) -> Result<()> {
        let screen = surface.bounds();
        let (w, h) = (screen.width(), screen.height());
        let mut stack = WindowStack::new(heap, screen);
        stack.create(Rect::from_xywh(w / 16, h / 12, w / 2, h / 2));
        stack.create(Rect::from_xywh(w / 3, h / 4, w / 2, h / 2));
        stack.create(Rect::from_xywh(w / 8, h / 2, w / 3, h / 3));
        stack.create(Rect::from_xywh(w * 2 / 3, h / 16, w / 2, h / 3));

        let style = WindowStyle::default();
        // Paint top-down to show that stacking comes from the clip, not the order.
        let regions = stack.visible_regions()?;
        for (idx, (id, visible)) in regions.iter().enumerate().rev() {
            let rect = stack.rect(*id)?;
            info!("window {} at {:?}: {} visible rects", id, rect, visible.len());

            let clip = surface.clip_mut();
            clip.set_device(rect)?;
            clip.set_visible_region(Some(visible))?;

            let client = draw_window(surface, rect.width(), rect.height(), &style);
            surface.clip_mut().select_clip_rect(Some(client))?;

            let accent = self.accents[idx % self.accents.len()];
            let (cx, cy) = (client.left + client.width() / 2, client.top + client.height() / 2);
            let r = client.width().min(client.height()) / 3;
            surface.fill_circle(cx, cy, r, accent);
            surface.fill_polygon(
                &[
                    Point::new(client.left, client.bottom),
                    Point::new(cx, cy),
                    Point::new(client.right, client.bottom),
                ],
                Rgba([accent.0[0] / 2, accent.0[1] / 2, accent.0[2] / 2, 255]),
            );
        }

        let desktop = stack.desktop_region()?;
        info!("desktop keeps {} pixels in {} rects", desktop.area(), desktop.len());
        Ok(())
    }
}
