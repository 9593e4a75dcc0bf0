//! Studio settings shared by the CLI and the editor.
//!
//! Loaded from an optional JSON file; every field has a default, so a file
//! only needs to name what it changes.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::consts::{BORDER_SAMPLES, BORDER_THICKNESS, CUTOUT_TOLERANCE, MAX_STICKERS};
use crate::error::Result;
use crate::imaging::{BorderOptions, CutoutOptions};
use crate::scene::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StudioConfig {
    /// JSON file holding the saved stickers.
    pub store_path: PathBuf,
    /// TrueType/OpenType font for text and effect glyphs.
    pub font_path: Option<PathBuf>,
    pub cutout_tolerance: u8,
    pub border_thickness: u32,
    pub border_samples: u32,
    /// `#rrggbb` fill color of the silhouette border.
    pub border_color: String,
    pub capacity: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("stickers.json"),
            font_path: None,
            cutout_tolerance: CUTOUT_TOLERANCE,
            border_thickness: BORDER_THICKNESS,
            border_samples: BORDER_SAMPLES,
            border_color: Color::WHITE.to_hex(),
            capacity: MAX_STICKERS,
        }
    }
}

impl StudioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StudioConfig = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Defaults, overlaid with `path` when given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn cutout_options(&self) -> CutoutOptions {
        CutoutOptions {
            tolerance: self.cutout_tolerance,
        }
    }

    pub fn border_options(&self) -> Result<BorderOptions> {
        Ok(BorderOptions {
            thickness: self.border_thickness,
            samples: self.border_samples,
            color: Color::from_hex(&self.border_color)?,
        })
    }
}

/// Options shared by every binary. Explicit flags override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// JSON settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Sticker collection file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    /// Font used for text and effects
    #[arg(long, global = true)]
    pub font: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn resolve(&self) -> Result<StudioConfig> {
        let mut config = StudioConfig::load_or_default(self.config.as_deref())?;
        if let Some(store) = &self.store {
            config.store_path = store.clone();
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        Ok(config)
    }
}
