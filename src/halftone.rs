// Halftone: re-draws a picture as a screen of dots, darker areas -> bigger dots.
// Visual expectation: the image in its panel turns into a newspaper-style dot print;
// when interactive, moving the mouse over it tilts the screen, grows the dots and
// loosens the grid, easing back to neutral when the mouse leaves.

use image::RgbaImage;
use serde::Deserialize;

use crate::draw::Canvas;
use crate::ease::lerp;
use crate::error::{Error, Result};
use crate::host::{ComponentId, EventKind, FrameHandle, Host, ListenerId};
use crate::panel::{ImagePanel, PanelRect};
use crate::types::{Color, FrameBuffer};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HalftoneConfig {
    pub spacing: f32,         // px between dot centres
    pub max_size: f32,        // radius of a fully dark dot, px
    pub min_size: f32,        // radius of a fully light dot, px
    pub contrast: f32,        // multiplier pivoted at mid-grey
    pub threshold: f32,       // 0..255; anything darker is drawn at max_size
    pub angle: f32,           // screen rotation, degrees
    pub mouse_influence: f32, // 0..1
    pub interactive: bool,
    pub smoothing: f32,       // 0..1 per-frame lerp toward pointer targets
    pub dot_color: Color,
}

impl Default for HalftoneConfig {
    fn default() -> Self {
        Self {
            spacing: 15.0,
            max_size: 12.0,
            min_size: 0.0,
            contrast: 1.0,
            threshold: 128.0,
            angle: 0.0,
            mouse_influence: 0.5,
            interactive: true,
            smoothing: 0.15,
            dot_color: Color::rgb(0xff, 0xff, 0xff),
        }
    }
}

/// A partial update; unset fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HalftonePatch {
    pub spacing: Option<f32>,
    pub max_size: Option<f32>,
    pub min_size: Option<f32>,
    pub contrast: Option<f32>,
    pub threshold: Option<f32>,
    pub angle: Option<f32>,
    pub mouse_influence: Option<f32>,
    pub interactive: Option<bool>,
    pub smoothing: Option<f32>,
    pub dot_color: Option<Color>,
}

impl HalftoneConfig {
    /// Pure merge: returns the patched config, or the first field that is out of range.
    pub fn apply(&self, patch: &HalftonePatch) -> Result<Self> {
        let next = Self {
            spacing: patch.spacing.unwrap_or(self.spacing),
            max_size: patch.max_size.unwrap_or(self.max_size),
            min_size: patch.min_size.unwrap_or(self.min_size),
            contrast: patch.contrast.unwrap_or(self.contrast),
            threshold: patch.threshold.unwrap_or(self.threshold),
            angle: patch.angle.unwrap_or(self.angle),
            mouse_influence: patch.mouse_influence.unwrap_or(self.mouse_influence),
            interactive: patch.interactive.unwrap_or(self.interactive),
            smoothing: patch.smoothing.unwrap_or(self.smoothing),
            dot_color: patch.dot_color.unwrap_or(self.dot_color),
        };
        next.validate()?;
        Ok(next)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = |field: &'static str, v: f32| {
            if v.is_finite() { Ok(()) } else { Err(Error::invalid(field, "must be a finite number")) }
        };
        finite("halftone.angle", self.angle)?;
        finite("halftone.contrast", self.contrast)?;
        // spacing below one pixel would mean millions of samples per frame
        if !(self.spacing.is_finite() && self.spacing >= 1.0) {
            return Err(Error::invalid("halftone.spacing", "must be >= 1"));
        }
        if !(self.min_size.is_finite() && self.min_size >= 0.0) {
            return Err(Error::invalid("halftone.min_size", "must be >= 0"));
        }
        if !(self.max_size.is_finite() && self.max_size >= self.min_size) {
            return Err(Error::invalid("halftone.max_size", "must be >= min_size"));
        }
        if !(0.0..=255.0).contains(&self.threshold) {
            return Err(Error::invalid("halftone.threshold", "must be within 0..=255"));
        }
        if !(0.0..=1.0).contains(&self.mouse_influence) {
            return Err(Error::invalid("halftone.mouse_influence", "must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(Error::invalid("halftone.smoothing", "must be within 0..=1"));
        }
        Ok(())
    }
}

/// Named starting points. Same knobs, different defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Newspaper, // coarse, tilted print
    Comic,     // punchy contrast
    Fine,      // small dots, barely reacts to the mouse
    Interactive,
}

impl Preset {
    pub fn patch(self) -> HalftonePatch {
        match self {
            Preset::Newspaper => HalftonePatch {
                spacing: Some(20.0), max_size: Some(15.0), contrast: Some(1.2),
                threshold: Some(128.0), angle: Some(15.0), mouse_influence: Some(0.3),
                ..HalftonePatch::default()
            },
            Preset::Comic => HalftonePatch {
                spacing: Some(12.0), max_size: Some(10.0), contrast: Some(1.8),
                threshold: Some(100.0), mouse_influence: Some(0.7),
                ..HalftonePatch::default()
            },
            Preset::Fine => HalftonePatch {
                spacing: Some(8.0), max_size: Some(6.0), contrast: Some(1.0),
                threshold: Some(150.0), mouse_influence: Some(0.2),
                ..HalftonePatch::default()
            },
            Preset::Interactive => HalftonePatch {
                spacing: Some(15.0), max_size: Some(12.0), contrast: Some(1.5),
                threshold: Some(120.0), mouse_influence: Some(0.8), smoothing: Some(0.15),
                ..HalftonePatch::default()
            },
        }
    }

    pub fn config(self) -> Result<HalftoneConfig> {
        HalftoneConfig::default().apply(&self.patch())
    }
}

/* ---------- sampling ---------- */

/// Weighted luma (0.299 R + 0.587 G + 0.114 B), exact for grey pixels.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    (299 * r as u32 + 587 * g as u32 + 114 * b as u32) as f32 / 1000.0
}

/// Contrast pivoted at 128, clamped to 0..=255.
#[inline]
pub fn apply_contrast(luma: f32, contrast: f32) -> f32 {
    ((luma - 128.0) * contrast + 128.0).clamp(0.0, 255.0)
}

/// Dot radius for one sampled luma value.
pub fn dot_radius(luma: f32, cfg: &HalftoneConfig) -> f32 {
    let grey = apply_contrast(luma, cfg.contrast);
    let darkness = if grey < cfg.threshold { 1.0 } else { (255.0 - grey) / 255.0 };
    cfg.min_size + darkness * (cfg.max_size - cfg.min_size)
}

/// One dot of the screen, in bitmap pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Rotate (x, y) by `angle_rad` around (cx, cy).
#[inline]
fn rotate_about(x: f32, y: f32, cx: f32, cy: f32, angle_rad: f32) -> (f32, f32) {
    let (sin, cos) = angle_rad.sin_cos();
    let (dx, dy) = (x - cx, y - cy);
    (cos * dx - sin * dy + cx, sin * dx + cos * dy + cy)
}

/// Grid centres `spacing/2, 3*spacing/2, ...` over the bitmap, each sampled through the
/// rotated screen. Centres whose rotated sample falls off the bitmap are skipped.
pub fn sample_dots(image: &RgbaImage, cfg: &HalftoneConfig) -> Vec<Dot> {
    let (w, h) = image.dimensions();
    let (wf, hf) = (w as f32, h as f32);
    let (cx, cy) = (wf / 2.0, hf / 2.0);
    let angle = cfg.angle.to_radians();
    let spacing = cfg.spacing;

    let mut dots = Vec::new();
    let mut y = spacing / 2.0;
    while y < hf {
        let mut x = spacing / 2.0;
        while x < wf {
            let (rx, ry) = rotate_about(x, y, cx, cy, angle);
            if rx >= 0.0 && rx < wf && ry >= 0.0 && ry < hf {
                let [r, g, b, _] = image.get_pixel(rx as u32, ry as u32).0;
                let radius = dot_radius(luminance(r, g, b), cfg);
                if radius > 0.5 {
                    dots.push(Dot { x, y, radius });
                }
            }
            x += spacing;
        }
        y += spacing;
    }
    dots
}

/* ---------- the effect ---------- */

pub struct HalftoneEffect {
    id: ComponentId,
    samples: RgbaImage,            // captured once, read-only
    surface: Option<FrameBuffer>,  // None after destroy
    rect: PanelRect,               // borrowed layout of the source panel
    base: HalftoneConfig,          // what the user configured
    current: HalftoneConfig,       // what is being drawn
    target: HalftoneConfig,        // where the pointer wants it
    pointer: (f32, f32),           // normalized, (0.5, 0.5) = neutral
    frame: Option<FrameHandle>,
    listeners: Vec<ListenerId>,
}

impl HalftoneEffect {
    /// Take over `panel`: hide the original picture and show the dot screen in its place.
    /// The source must already be decoded. A missing panel only logs a warning.
    pub fn create(host: &mut Host, panel: Option<&mut ImagePanel>, config: HalftoneConfig) -> Option<Self> {
        let Some(panel) = panel else {
            log::warn!("halftone: no source image, effect disabled");
            return None;
        };
        if let Err(e) = config.validate() {
            log::warn!("halftone: {e}, effect disabled");
            return None;
        }

        let (w, h) = panel.natural_size();
        let mut effect = Self {
            id: host.register_component(),
            samples: panel.image.clone(),
            surface: Some(FrameBuffer::new(w as usize, h as usize)),
            rect: panel.rect,
            base: config.clone(),
            current: config.clone(),
            target: config,
            pointer: (0.5, 0.5),
            frame: None,
            listeners: Vec::new(),
        };
        panel.source_visible = false;
        log::info!(
            "halftone: {w}x{h} source, spacing {}, {}",
            effect.current.spacing,
            if effect.current.interactive { "interactive" } else { "static" }
        );

        effect.generate();
        if effect.current.interactive {
            effect.start_loop(host);
        }
        Some(effect)
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn surface(&self) -> Option<&FrameBuffer> {
        self.surface.as_ref()
    }

    pub fn rect(&self) -> PanelRect {
        self.rect
    }

    #[cfg(test)]
    pub fn current(&self) -> &HalftoneConfig {
        &self.current
    }

    #[cfg(test)]
    pub fn target(&self) -> &HalftoneConfig {
        &self.target
    }

    pub fn is_destroyed(&self) -> bool {
        self.surface.is_none()
    }

    fn start_loop(&mut self, host: &mut Host) {
        if self.frame.is_none() {
            self.frame = Some(host.request_frame(self.id));
        }
        if self.listeners.is_empty() {
            self.listeners.push(host.listen(self.id, EventKind::PointerMove));
            self.listeners.push(host.listen(self.id, EventKind::PointerLeave));
        }
    }

    fn stop_loop(&mut self, host: &mut Host) {
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
        }
        for id in self.listeners.drain(..) {
            host.unlisten(id);
        }
    }

    /// Pointer inside the picture, both axes normalized to [0,1] (clamped).
    pub fn update_from_pointer(&mut self, nx: f32, ny: f32) {
        if !self.current.interactive {
            return;
        }
        self.pointer = (nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0));
        self.retarget();
    }

    /// Pointer left the picture: ease back to neutral.
    pub fn pointer_leave(&mut self) {
        if !self.current.interactive {
            return;
        }
        self.pointer = (0.5, 0.5);
        self.retarget();
    }

    fn retarget(&mut self) {
        let (nx, ny) = self.pointer;
        let influence = self.base.mouse_influence;
        let from_centre = ((nx - 0.5).powi(2) + (ny - 0.5).powi(2)).sqrt();

        self.target.angle = (nx - 0.5) * 45.0 * influence;
        self.target.max_size = self.base.max_size * (1.0 + (ny - 0.5) * influence);
        self.target.spacing = self.base.spacing * (1.0 + influence * 0.5 * from_centre);
    }

    /// Redraw the dot screen; when interactive, first ease the live values toward the targets.
    pub fn generate(&mut self) {
        if self.current.interactive {
            let k = self.current.smoothing;
            self.current.angle = lerp(self.current.angle, self.target.angle, k);
            self.current.max_size = lerp(self.current.max_size, self.target.max_size, k);
            self.current.spacing = lerp(self.current.spacing, self.target.spacing, k);
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let dots = sample_dots(&self.samples, &self.current);
        surface.clear(None);
        for d in &dots {
            surface.fill_circle(d.x, d.y, d.radius, self.current.dot_color);
        }
    }

    /// One animation frame, then ask for the next while interactive.
    pub fn tick(&mut self, host: &mut Host) {
        if self.frame.take().is_none() {
            return;
        }
        self.generate();
        if self.current.interactive {
            self.frame = Some(host.request_frame(self.id));
        }
    }

    /// Merge `patch` into the configured, live and target values.
    /// Nothing changes if any field is out of range.
    pub fn update_config(&mut self, host: &mut Host, patch: &HalftonePatch) -> Result<()> {
        let base = self.base.apply(patch)?;
        let current = self.current.apply(patch)?;
        let target = self.target.apply(patch)?;
        let was_interactive = self.current.interactive;
        self.base = base;
        self.current = current;
        self.target = target;

        if self.is_destroyed() {
            return Ok(());
        }
        match (was_interactive, self.current.interactive) {
            (false, true) => {
                log::debug!("halftone: now interactive");
                self.start_loop(host);
            }
            (true, false) => {
                log::debug!("halftone: now static");
                self.stop_loop(host);
                self.pointer = (0.5, 0.5);
                self.target = self.current.clone();
            }
            _ => {}
        }
        if !self.current.interactive {
            // no loop will pick the change up
            self.generate();
        }
        Ok(())
    }

    /// Stop animating, give the panel its picture back and drop the surface.
    /// Calling it again does nothing.
    pub fn destroy(&mut self, host: &mut Host, panel: &mut ImagePanel) {
        if self.surface.is_none() {
            return;
        }
        self.stop_loop(host);
        panel.source_visible = true;
        self.surface = None;
        log::debug!("halftone: destroyed");
    }
}
