// Window + software drawing utilities.
// Visual effects provided here:
// 1) A resizable window that shows the composed frame.
// 2) Filled, anti-aliased circles (every dot of both effects).
// 3) A scaled blit that places a surface into a rectangle of the window.

use crate::error::Error;
use crate::panel::PanelRect;
use crate::types::{Color, FrameBuffer};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let opts = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, opts)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60); // the "next repaint" cadence every frame request waits on
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current client-area size; changes when the user drags the window border.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Mouse position in window pixels, or None while the cursor is outside the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }
}

/* ---------- Drawing surface seam ---------- */

/// What the effects need from a drawing surface.
pub trait Canvas {
    fn size(&self) -> (usize, usize);
    fn resize(&mut self, width: usize, height: usize);
    /// Wipe the whole surface; `None` leaves it transparent.
    fn clear(&mut self, background: Option<Color>);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);
}

impl Canvas for FrameBuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: usize, height: usize) {
        FrameBuffer::resize(self, width, height);
    }

    fn clear(&mut self, background: Option<Color>) {
        self.fill(background.map_or(crate::types::TRANSPARENT, Color::to_argb));
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        // Scan just the bounding box, clipped to the surface.
        let x0 = (cx - radius - 1.0).floor().max(0.0) as i64;
        let y0 = (cy - radius - 1.0).floor().max(0.0) as i64;
        let x1 = ((cx + radius + 1.0).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((cy + radius + 1.0).ceil() as i64).min(self.height as i64 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                // Distance from the pixel centre; the last half pixel fades out.
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let idx = y as usize * self.width + x as usize;
                self.pixels[idx] = blend_over(color, coverage, self.pixels[idx]);
            }
        }
    }
}

/// Straight-alpha "source over" of `color` at `alpha` onto a 0xAARRGGBB pixel.
#[inline]
fn blend_over(color: Color, alpha: f32, dst: u32) -> u32 {
    if alpha >= 1.0 {
        return color.to_argb();
    }
    let da = ((dst >> 24) & 0xFF) as f32 / 255.0;
    let out_a = alpha + da * (1.0 - alpha);
    if out_a <= 0.0 {
        return crate::types::TRANSPARENT;
    }
    let mix = |s: u8, shift: u32| {
        let d = ((dst >> shift) & 0xFF) as f32;
        let v = (s as f32 * alpha + d * da * (1.0 - alpha)) / out_a;
        (v.round().clamp(0.0, 255.0) as u32) << shift
    };
    let a = (out_a * 255.0).round().clamp(0.0, 255.0) as u32;
    (a << 24) | mix(color.r, 16) | mix(color.g, 8) | mix(color.b, 0)
}

/// Nearest-neighbour copy of `src` stretched into `rect` of `dst`, honouring src alpha.
/// Visual: the halftone (or the original picture) appears inside its panel.
pub fn blit_scaled(dst: &mut FrameBuffer, src: &FrameBuffer, rect: PanelRect) {
    if rect.width == 0 || rect.height == 0 || src.width == 0 || src.height == 0 {
        return;
    }
    let x_end = (rect.x + rect.width).min(dst.width);
    let y_end = (rect.y + rect.height).min(dst.height);
    for y in rect.y..y_end {
        let sy = (y - rect.y) * src.height / rect.height;
        for x in rect.x..x_end {
            let sx = (x - rect.x) * src.width / rect.width;
            let p = src.pixels[sy * src.width + sx];
            let a = (p >> 24) & 0xFF;
            if a == 0 {
                continue;
            }
            let idx = y * dst.width + x;
            if a == 0xFF {
                dst.pixels[idx] = p;
            } else {
                let c = Color::rgb((p >> 16) as u8, (p >> 8) as u8, p as u8);
                dst.pixels[idx] = blend_over(c, a as f32 / 255.0, dst.pixels[idx]);
            }
        }
    }
}
