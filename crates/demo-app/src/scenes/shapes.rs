use anyhow::Result;
use region_core::{ClipRectHeap, ClipRegion, Point, RegionOp, combine};
use strata_surface::{Rgba, Surface};

use super::Scene;

/// Region algebra on generated shapes, one panel per operator.
#[derive(Default)]
pub struct ShapesScene;

impl Scene for ShapesScene {
    fn name(&self) -> &'static str {
        "shapes"
    }

    fn render(&mut self, surface: &mut Surface, heap: &ClipRectHeap) -> Result<()> {
        let screen = surface.bounds();
        let panel_w = screen.width() / 2;
        let panel_h = screen.height() / 2;
        let r = panel_w.min(panel_h) / 4;

        let ops = [
            (RegionOp::Union, Rgba([214, 96, 77, 255])),
            (RegionOp::Intersect, Rgba([94, 160, 92, 255])),
            (RegionOp::Subtract, Rgba([230, 180, 60, 255])),
            (RegionOp::Xor, Rgba([120, 98, 190, 255])),
        ];

        let mut circle = ClipRegion::new(heap);
        let mut star = ClipRegion::new(heap);
        let mut result = ClipRegion::new(heap);

        for (i, (op, color)) in ops.into_iter().enumerate() {
            let ox = (i as i32 % 2) * panel_w;
            let oy = (i as i32 / 2) * panel_h;
            let (cx, cy) = (ox + panel_w / 2, oy + panel_h / 2);

            circle.set_ellipse(cx - r / 2, cy, r, r * 3 / 4)?;
            star.set_polygon(&star_points(cx + r / 2, cy, r))?;
            combine(&mut result, &circle, &star, op)?;

            surface.fill_region(&result, color)?;
            log::info!("{:?}: {} rects, area {}", op, result.len(), result.area());
        }
        Ok(())
    }
}

fn star_points(cx: i32, cy: i32, r: i32) -> Vec<Point> {
    (0..5)
        .map(|k| {
            let angle = -std::f64::consts::FRAC_PI_2 + k as f64 * 4.0 * std::f64::consts::PI / 5.0;
            Point::new(
                cx + (r as f64 * angle.cos()).round() as i32,
                cy + (r as f64 * angle.sin()).round() as i32,
            )
        })
        .collect()
}
