use anyhow::Result;
use region_core::{ClipRectHeap, ClipRegion, Rect};
use strata_surface::{ClipMode, Rgba, Surface};

use super::Scene;

/// The clip-selection modes, each applied to a striped base clip.
#[derive(Default)]
pub struct ModesScene;

impl Scene for ModesScene {
    fn name(&self) -> &'static str {
        "modes"
    }

    fn render(&mut self, surface: &mut Surface, heap: &ClipRectHeap) -> Result<()> {
        let screen = surface.bounds();
        let modes = [ClipMode::Copy, ClipMode::And, ClipMode::Or, ClipMode::Diff, ClipMode::Xor];
        let panel_w = screen.width() / modes.len() as i32;
        let panel_h = screen.height();
        let fill = Rgba([86, 156, 214, 255]);

        for (i, mode) in modes.into_iter().enumerate() {
            let panel = Rect::from_xywh(i as i32 * panel_w, 0, panel_w, panel_h).inflate(-4, -4);
            let clip = surface.clip_mut();
            clip.set_device(panel)?;

            // Base clip: horizontal stripes.
            clip.select_clip_rect(Some(Rect::new(0, 0, panel.width(), 8)))?;
            let mut y = 16;
            while y < panel.height() {
                clip.include_clip_rect(Rect::new(0, y, panel.width(), y + 8))?;
                y += 16;
            }

            let mut disc = ClipRegion::new(heap);
            let r = panel.width().min(panel.height()) * 2 / 5;
            disc.set_circle(panel.width() / 2, panel.height() / 2, r)?;
            let kind = clip.select_clip_region_mode(Some(&disc), mode)?;
            log::info!("{:?} -> {:?}, clip box {:?}", mode, kind, clip.clip_box());

            surface.fill_rect(Rect::new(0, 0, panel.width(), panel.height()), fill);
        }
        Ok(())
    }
}
