// The picture slot the halftone takes over.
// Visual: a rectangle of the window showing either the original image or its halftone.

use std::path::Path;

use image::RgbaImage;

use crate::error::Error;
use crate::types::FrameBuffer;

/// Where a panel sits in the window (its "layout styling").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PanelRect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.width) as f32
            && py < (self.y + self.height) as f32
    }

    /// Window pixel -> position inside the panel in [0,1] on both axes (clamped).
    pub fn normalize(&self, px: f32, py: f32) -> (f32, f32) {
        let nx = (px - self.x as f32) / self.width.max(1) as f32;
        let ny = (py - self.y as f32) / self.height.max(1) as f32;
        (nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
    }

    /// Fit a `w x h` picture inside `max_w x max_h`, keeping aspect ratio, anchored at (x, y).
    pub fn fit(x: usize, y: usize, w: u32, h: u32, max_w: usize, max_h: usize) -> Self {
        let sx = max_w as f32 / w.max(1) as f32;
        let sy = max_h as f32 / h.max(1) as f32;
        let s = sx.min(sy).min(1.0);
        Self {
            x,
            y,
            width: ((w as f32 * s).round() as usize).max(1),
            height: ((h as f32 * s).round() as usize).max(1),
        }
    }
}

/// Lays panels out left to right, starting a new row at the window's right edge.
pub struct Shelf {
    margin: usize,
    max_side: usize,
    window_width: usize,
    x: usize,
    y: usize,
    row_height: usize,
}

impl Shelf {
    pub fn new(margin: usize, max_side: usize, window_width: usize) -> Self {
        Self { margin, max_side, window_width, x: margin, y: margin, row_height: 0 }
    }

    /// Rect for the next `w x h` picture.
    pub fn place(&mut self, w: u32, h: u32) -> PanelRect {
        let mut rect = PanelRect::fit(self.x, self.y, w, h, self.max_side, self.max_side);
        if self.x > self.margin && rect.x + rect.width + self.margin > self.window_width {
            self.x = self.margin;
            self.y += self.row_height + self.margin;
            self.row_height = 0;
            rect.x = self.x;
            rect.y = self.y;
        }
        self.x = rect.x + rect.width + self.margin;
        self.row_height = self.row_height.max(rect.height);
        rect
    }
}

pub struct ImagePanel {
    pub image: RgbaImage,      // decoded source, natural resolution
    pub preview: FrameBuffer,  // same pixels, ready to blit while the source is shown
    pub rect: PanelRect,
    pub source_visible: bool,
}

impl ImagePanel {
    pub fn new(image: RgbaImage, rect: PanelRect) -> Self {
        let (w, h) = image.dimensions();
        let mut preview = FrameBuffer::new(w as usize, h as usize);
        for (dst, px) in preview.pixels.iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = px.0;
            *dst = ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        }
        Self { image, preview, rect, source_visible: true }
    }

    pub fn open(path: &Path, rect_for: impl FnOnce(u32, u32) -> PanelRect) -> Result<Self, Error> {
        let image = image::open(path)
            .map_err(|source| Error::ImageLoad { path: path.to_path_buf(), source })?
            .to_rgba8();
        let (w, h) = image.dimensions();
        log::info!("loaded {} ({w}x{h})", path.display());
        let rect = rect_for(w, h);
        Ok(Self::new(image, rect))
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_clamps_outside_points() {
        let r = PanelRect { x: 10, y: 20, width: 100, height: 50 };
        assert_eq!(r.normalize(60.0, 45.0), (0.5, 0.5));
        assert_eq!(r.normalize(0.0, 500.0), (0.0, 1.0));
        assert!(r.contains(10.0, 20.0));
        assert!(!r.contains(110.0, 20.0));
    }

    #[test]
    fn fit_keeps_aspect_and_never_upscales() {
        assert_eq!(PanelRect::fit(0, 0, 400, 200, 200, 200),
                   PanelRect { x: 0, y: 0, width: 200, height: 100 });
        assert_eq!(PanelRect::fit(5, 5, 40, 20, 200, 200),
                   PanelRect { x: 5, y: 5, width: 40, height: 20 });
    }

    #[test]
    fn shelf_fills_rows_then_wraps() {
        let mut shelf = Shelf::new(10, 100, 250);
        assert_eq!(shelf.place(200, 100), PanelRect { x: 10, y: 10, width: 100, height: 50 });
        assert_eq!(shelf.place(80, 80), PanelRect { x: 120, y: 10, width: 80, height: 80 });
        // 210 + 50 + 10 > 250: next row, below the tallest panel so far
        assert_eq!(shelf.place(50, 50), PanelRect { x: 10, y: 100, width: 50, height: 50 });
    }

    #[test]
    fn shelf_never_wraps_the_first_panel_of_a_row() {
        let mut shelf = Shelf::new(10, 500, 100);
        assert_eq!(shelf.place(300, 20), PanelRect { x: 10, y: 10, width: 300, height: 20 });
        assert_eq!(shelf.place(300, 20).y, 40);
    }

    #[test]
    fn preview_packs_argb() {
        let img = RgbaImage::from_pixel(2, 1, image::Rgba([1, 2, 3, 255]));
        let panel = ImagePanel::new(img, PanelRect { x: 0, y: 0, width: 2, height: 1 });
        assert_eq!(panel.preview.pixels, vec![0xFF01_0203; 2]);
        assert!(panel.source_visible);
    }
}
