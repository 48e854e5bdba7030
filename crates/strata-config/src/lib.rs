//! Strata configuration system
//!
//! Centralized settings for the clip-region heap, the software surface and
//! the demo binary, loaded from `strata.toml` with environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "strata.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrataConfig {
    /// Clip-rect block heap settings
    pub heap: HeapConfig,
    /// Software surface settings
    pub surface: SurfaceConfig,
    /// Demo application settings
    pub demo: DemoConfig,
    /// Logging settings
    pub log: LogConfig,
}

/// Block heap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// Number of pre-allocated clip-rect blocks
    pub block_count: usize,
    /// Maximum live blocks taken from the general allocator once the arena
    /// is full. Unlimited when unset.
    pub overflow_limit: Option<usize>,
}

/// Surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    /// Clear color as RGBA
    pub background: [u8; 4],
}

/// Demo application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Scene to render (windows, shapes, modes, scroll)
    pub scene: Option<String>,
    /// Where the rendered PNG is written
    pub output: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// env_logger filter string, e.g. "info" or "region_core=trace"
    pub filter: String,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self { block_count: 256, overflow_limit: None }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self { width: 640, height: 480, background: [32, 32, 36, 255] }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { scene: None, output: PathBuf::from("strata.png") }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|val| val.trim().parse().ok())
}

impl StrataConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(StrataConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load `strata.toml` from the current directory, or defaults if it is
    /// missing or malformed
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Values that fail to parse are ignored.
    pub fn merge_with_env(&mut self) {
        // Heap settings
        if let Some(count) = parse_env("STRATA_HEAP_BLOCKS") {
            self.heap.block_count = count;
        }
        if let Ok(val) = std::env::var("STRATA_OVERFLOW_LIMIT") {
            let val = val.trim();
            if val.is_empty() || val.eq_ignore_ascii_case("none") {
                self.heap.overflow_limit = None;
            } else if let Ok(limit) = val.parse::<usize>() {
                self.heap.overflow_limit = Some(limit);
            }
        }

        // Surface settings
        if let Some(width) = parse_env("STRATA_WIDTH") {
            self.surface.width = width;
        }
        if let Some(height) = parse_env("STRATA_HEIGHT") {
            self.surface.height = height;
        }

        // Demo settings
        if let Ok(scene) = std::env::var("STRATA_SCENE") {
            self.demo.scene = Some(scene);
        }
        if let Ok(output) = std::env::var("STRATA_OUTPUT") {
            self.demo.output = PathBuf::from(output);
        }

        if let Ok(filter) = std::env::var("STRATA_LOG") {
            self.log.filter = filter;
        }
    }

    /// Load configuration with environment variable overrides:
    /// 1. Load from strata.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StrataConfig::default();
        assert_eq!(config.heap.block_count, 256);
        assert_eq!(config.heap.overflow_limit, None);
        assert_eq!((config.surface.width, config.surface.height), (640, 480));
        assert_eq!(config.demo.output, PathBuf::from("strata.png"));
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = StrataConfig::default();
        config.heap.overflow_limit = Some(12);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: StrataConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.heap.overflow_limit, Some(12));
        assert_eq!(parsed.surface.background, [32, 32, 36, 255]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: StrataConfig = toml::from_str(
            r#"
            [heap]
            block_count = 32

            [demo]
            scene = "shapes"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.heap.block_count, 32);
        assert_eq!(parsed.demo.scene.as_deref(), Some("shapes"));
        assert_eq!(parsed.surface.width, 640);
        assert_eq!(parsed.log.filter, "info");
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = StrataConfig::load_from_file("does-not-exist/strata.toml").unwrap_err();
        assert!(err.starts_with("Failed to read config file"));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("STRATA_SCENE", "windows");
            std::env::set_var("STRATA_HEAP_BLOCKS", "64");
            std::env::set_var("STRATA_OVERFLOW_LIMIT", "8");
            std::env::set_var("STRATA_WIDTH", "not-a-number");
        }

        let mut config = StrataConfig::default();
        config.merge_with_env();

        assert_eq!(config.demo.scene.as_deref(), Some("windows"));
        assert_eq!(config.heap.block_count, 64);
        assert_eq!(config.heap.overflow_limit, Some(8));
        assert_eq!(config.surface.width, 640);

        unsafe {
            std::env::remove_var("STRATA_SCENE");
            std::env::remove_var("STRATA_HEAP_BLOCKS");
            std::env::remove_var("STRATA_OVERFLOW_LIMIT");
            std::env::remove_var("STRATA_WIDTH");
        }
    }
}
