// Core types shared by the dot field, the halftone and the window host.

use serde::Deserialize;

use crate::error::Error;

/// Fully transparent pixel. Visual: the blit skips it, so whatever is below shows through.
pub const TRANSPARENT: u32 = 0x00_00_00_00;

#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the surface is (pixels)
    pub height: usize,     // how tall the surface is (pixels)
    pub pixels: Vec<u32>,  // each entry is 0xAARRGGBB; minifb ignores the alpha byte
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![TRANSPARENT; width * height] }
    }

    /// Reallocate for a new size. Old content is discarded (the next frame redraws it all).
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, TRANSPARENT);
    }

    pub fn fill(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}

/// Opaque RGB color, written as `"#rrggbb"` in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || Error::invalid("color", format!("`{s}` is not a #rrggbb color"));
        if !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
        match hex.len() {
            6 => Ok(Self::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                // #abc == #aabbcc
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(bad()),
        }
    }

    /// Pack as an opaque 0xFFRRGGBB pixel.
    #[inline]
    pub fn to_argb(self) -> u32 {
        0xFF00_0000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl TryFrom<String> for Color {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex(&s)
    }
}

/// One lattice sample of the dot field.
/// Visual: a single dot; `size` is what you see, `target_size` is where it is heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    pub base_x: f32, pub base_y: f32, // fixed lattice coordinate
    pub x: f32, pub y: f32,           // base + idle drift, recomputed every frame
    pub size: f32,                    // rendered radius
    pub target_size: f32,             // radius the proximity rule asks for
}

impl GridPoint {
    pub fn at(base_x: f32, base_y: f32, size: f32) -> Self {
        Self { base_x, base_y, x: base_x, y: base_y, size, target_size: size }
    }
}

/// Pan/zoom applied to every grid point before distance checks and drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
    pub target_offset_x: f32,
    pub target_offset_y: f32,
    pub target_scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset_x: 0.0, offset_y: 0.0, scale: 1.0,
            target_offset_x: 0.0, target_offset_y: 0.0, target_scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// World -> screen for a grid point.
    #[inline]
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        ((x + self.offset_x) * self.scale, (y + self.offset_y) * self.scale)
    }
}

/// Last known pointer position, surface-relative pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl Default for PointerState {
    // Far off-surface so nothing is boosted until the pointer shows up.
    fn default() -> Self {
        Self { x: f32::NEG_INFINITY, y: f32::NEG_INFINITY }
    }
}

/// Camera state pushed by an external pannable/zoomable view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewChange {
    pub position: (f32, f32),
    pub scale: f32,
    pub focus_point: Option<(f32, f32)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::from_hex("#89ffb8").unwrap(), Color::rgb(0x89, 0xff, 0xb8));
        assert_eq!(Color::from_hex("fff").unwrap(), Color::rgb(255, 255, 255));
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn color_packs_opaque() {
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_argb(), 0xFF12_3456);
    }

    #[test]
    fn resize_discards_content() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.fill(0xFFFF_FFFF);
        fb.resize(3, 1);
        assert_eq!(fb.pixels, vec![TRANSPARENT; 3]);
        assert_eq!(fb.get(2, 0), Some(TRANSPARENT));
        assert_eq!(fb.get(0, 1), None);
    }
}
