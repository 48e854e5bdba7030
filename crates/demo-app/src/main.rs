use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};
use region_core::ClipRectHeap;
use strata_config::StrataConfig;
use strata_surface::{Rgba, Surface};

mod scenes;
use scenes::{SCENES, Scene};

fn arg_value(prefix: &str) -> Option<String> {
    std::env::args().find_map(|a| a.strip_prefix(prefix).map(str::to_string))
}

fn main() -> Result<()> {
    let mut config = match arg_value("--config=") {
        Some(path) => StrataConfig::load_from_file(&path).map_err(anyhow::Error::msg)?,
        None => StrataConfig::load_or_default(),
    };
    config.merge_with_env();

    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log.filter.as_str()),
    )
    .try_init();

    // Scene selection: --scene=<name> or --<name>, then config / STRATA_SCENE.
    let scene_name = arg_value("--scene=")
        .or_else(|| {
            std::env::args()
                .filter_map(|a| a.strip_prefix("--").map(str::to_string))
                .find(|a| SCENES.contains(&a.as_str()))
        })
        .or_else(|| config.demo.scene.clone())
        .unwrap_or_else(|| "windows".to_string());
    if !SCENES.contains(&scene_name.as_str()) {
        warn!("unknown scene {:?}, using windows (known: {:?})", scene_name, SCENES);
    }
    let mut scene: Box<dyn Scene> = scenes::by_name(&scene_name);

    let output = arg_value("--output=")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.demo.output.clone());

    let heap =
        ClipRectHeap::with_overflow_limit(config.heap.block_count, config.heap.overflow_limit)
            .context("failed to reserve clip-rect heap")?;
    let mut surface = Surface::new(&heap, config.surface.width, config.surface.height)?;
    surface.clear(Rgba(config.surface.background));

    info!(
        "rendering scene '{}' at {}x{}",
        scene.name(),
        config.surface.width,
        config.surface.height
    );
    scene
        .render(&mut surface, &heap)
        .with_context(|| format!("scene '{}' failed", scene.name()))?;

    info!(
        "heap: {} of {} arena blocks in use, {} overflow allocations",
        heap.used_blocks(),
        heap.block_count(),
        heap.extra_alloc_count()
    );

    surface
        .save_png(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}
