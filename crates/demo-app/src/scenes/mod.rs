use anyhow::Result;
use region_core::ClipRectHeap;
use strata_surface::Surface;

pub trait Scene {
    fn name(&self) -> &'static str;
    /// Paint the scene onto an already cleared surface.
    fn render(&mut self, surface: &mut Surface, heap: &ClipRectHeap) -> Result<()>;
}

pub mod modes;
pub mod scroll;
pub mod shapes;
pub mod windows;

pub const SCENES: &[&str] = &["windows", "shapes", "modes", "scroll"];

/// Scene by name; unknown names fall back to the window scene.
pub fn by_name(name: &str) -> Box<dyn Scene> {
    match name {
        "shapes" => Box::new(shapes::ShapesScene::default()),
        "modes" => Box::new(modes::ModesScene::default()),
        "scroll" => Box::new(scroll::ScrollScene::default()),
        _ => Box::new(windows::WindowsScene::default()),
    }
}
