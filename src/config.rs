// Startup settings: optional TOML file, then command-line flags on top.
//
// ```toml
// [window]
// width = 1280
// height = 800
//
// [dots]
// spacing = 40
// palette = "light"
// drift = { enabled = false }
//
// [halftone]
// images = ["portrait.png", "team.jpg"]
// preset = "newspaper"
// dot_color = "#89ffb8"   # any halftone field overrides the preset
// ```

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::dotfield::{DotFieldConfig, Palette};
use crate::error::{Error, Result};
use crate::halftone::{HalftoneConfig, HalftonePatch, Preset};

#[derive(Parser, Debug, Default)]
#[command(name = "dotscreen", version, about = "Proximity dot field backdrop with an interactive halftone panel")]
pub struct Args {
    /// TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Picture to show as a halftone; repeat for more panels
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
    /// Halftone preset
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,
    #[arg(long)]
    pub width: Option<usize>,
    #[arg(long)]
    pub height: Option<usize>,
    /// Start with the light palette
    #[arg(long)]
    pub light: bool,
    /// Keep the dot grid still
    #[arg(long)]
    pub no_drift: bool,
    /// Render the halftone once instead of following the mouse
    #[arg(long = "static")]
    pub static_halftone: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub panel_margin: usize, // px around and between halftone panels
    pub panel_max: usize,    // longest panel side, px
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "dotscreen".to_string(),
            width: 1024,
            height: 720,
            panel_margin: 48,
            panel_max: 420,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HalftoneSection {
    pub images: Vec<PathBuf>,
    pub preset: Option<Preset>,
    #[serde(flatten)]
    pub overrides: HalftonePatch,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub dots: DotFieldConfig,
    pub halftone: HalftoneSection,
}

impl AppConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::ConfigParse { path: path.to_path_buf(), source })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| Error::ConfigRead { path: path.to_path_buf(), source })?;
        let cfg = Self::parse(&text, path)?;
        log::debug!("config loaded from {}", path.display());
        Ok(cfg)
    }

    /// File (if any) + flags, validated.
    pub fn from_args(args: &Args) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let cfg = base.with_args(args);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if args.light {
            self.dots.palette = Palette::Light;
        }
        if args.no_drift {
            self.dots.drift.enabled = false;
        }
        if !args.images.is_empty() {
            self.halftone.images = args.images.clone();
        }
        if args.preset.is_some() {
            self.halftone.preset = args.preset;
        }
        if args.static_halftone {
            self.halftone.overrides.interactive = Some(false);
        }
        self
    }

    /// Preset (or defaults) with the file's per-field overrides applied.
    pub fn halftone_config(&self) -> Result<HalftoneConfig> {
        let base = match self.halftone.preset {
            Some(p) => p.config()?,
            None => HalftoneConfig::default(),
        };
        base.apply(&self.halftone.overrides)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::invalid("window", "width and height must be > 0"));
        }
        self.dots.validate()?;
        self.halftone_config()?;
        Ok(())
    }
}
