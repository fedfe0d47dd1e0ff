//! Render settings loaded from a JSON file or the command line.
//!
//! Every field is optional; a layer only replaces what it names. Layers are
//! applied over the scene defaults in order, file first, then flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ember_renderer::{Background, RenderConfig, Sampling};

use crate::scenes::SceneDefaults;

/// Partial override of a scene's defaults.
///
/// ```json
/// { "width": 800, "samples_per_pixel": 64, "background": { "solid": [0.1, 0.1, 0.2] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub width: Option<u32>,
    pub samples_per_pixel: Option<u32>,
    pub max_depth: Option<u32>,
    pub background: Option<Background>,
    pub sampling: Option<Sampling>,
    pub bucket_size: Option<u32>,
    pub seed: Option<u64>,
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = Self::from_json(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        log::debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Layer `top` over `self`; fields set in `top` win.
    pub fn overlay(self, top: Settings) -> Settings {
        Settings {
            width: top.width.or(self.width),
            samples_per_pixel: top.samples_per_pixel.or(self.samples_per_pixel),
            max_depth: top.max_depth.or(self.max_depth),
            background: top.background.or(self.background),
            sampling: top.sampling.or(self.sampling),
            bucket_size: top.bucket_size.or(self.bucket_size),
            seed: top.seed.or(self.seed),
        }
    }

    /// Resolve the final width and render config from scene defaults.
    pub fn apply(&self, defaults: &SceneDefaults) -> (u32, RenderConfig) {
        let width = self.width.unwrap_or(defaults.width).max(1);

        let mut config = defaults.config.clone();
        if let Some(spp) = self.samples_per_pixel {
            config = config.with_samples(spp);
        }
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if let Some(background) = self.background {
            config = config.with_background(background);
        }
        if let Some(sampling) = self.sampling {
            config = config.with_sampling(sampling);
        }
        if let Some(size) = self.bucket_size {
            config = config.with_bucket_size(size);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        (width, config)
    }
}
