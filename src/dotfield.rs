// Proximity dot field: the animated backdrop.
// Visual expectation: a calm grid of small dots; dots near the pointer swell smoothly,
// the whole grid drifts a little, and it pans/zooms along with whatever is in front.

use serde::Deserialize;

use crate::draw::Canvas;
use crate::ease::approach;
use crate::error::{Error, Result};
use crate::host::{ComponentId, EventKind, FrameHandle, Host, ListenerId};
use crate::types::{Color, GridPoint, PointerState, ViewChange, ViewTransform};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Dark,
    Light,
}

impl Palette {
    pub fn background(self) -> Color {
        match self {
            Palette::Dark => Color::rgb(0x1f, 0x1f, 0x1f),
            Palette::Light => Color::rgb(0xf4, 0xf4, 0xf4),
        }
    }

    pub fn dot(self) -> Color {
        match self {
            Palette::Dark => Color::rgb(0x89, 0xff, 0xb8),
            Palette::Light => Color::rgb(0x1f, 0x1f, 0x1f),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Palette::Dark => Palette::Light,
            Palette::Light => Palette::Dark,
        }
    }
}

/// Idle oscillation. Each dot gets its own phase from its index, so the grid
/// wobbles without looking like one rigid sheet.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Drift {
    pub enabled: bool,
    pub time_scale: f32,   // elapsed seconds -> oscillator time
    pub phase_x: f32,      // per-index phase step on x
    pub phase_y: f32,      // per-index phase step on y
    pub amplitude_x: f32,  // px
    pub amplitude_y: f32,  // px
}

impl Default for Drift {
    fn default() -> Self {
        Self {
            enabled: true,
            time_scale: 0.8,
            phase_x: 0.5,
            phase_y: 0.3,
            amplitude_x: 3.0,
            amplitude_y: 3.0,
        }
    }
}

impl Drift {
    #[inline]
    fn offset(&self, index: usize, elapsed_secs: f32) -> (f32, f32) {
        let t = elapsed_secs * self.time_scale;
        let i = index as f32;
        ((t + i * self.phase_x).sin() * self.amplitude_x, (t + i * self.phase_y).cos() * self.amplitude_y)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DotFieldConfig {
    pub spacing: f32,          // lattice step, px
    pub base_size: f32,        // resting dot radius, px
    pub proximity_radius: f32, // R: pointer reach, px
    pub max_scale: f32,        // extra growth at distance 0 (1 + max_scale times base)
    pub size_smoothing: f32,   // k_size
    pub view_smoothing: f32,   // k_pos
    pub cull_margin: f32,      // px around the viewport still drawn
    pub palette: Palette,
    pub drift: Drift,
}

impl Default for DotFieldConfig {
    fn default() -> Self {
        Self {
            spacing: 50.0,
            base_size: 1.5,
            proximity_radius: 150.0,
            max_scale: 2.5,
            size_smoothing: 0.2,
            view_smoothing: 0.05,
            cull_margin: 10.0,
            palette: Palette::Dark,
            drift: Drift::default(),
        }
    }
}

impl DotFieldConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(Error::invalid("dots.spacing", "must be > 0"));
        }
        if !(self.base_size.is_finite() && self.base_size >= 0.0) {
            return Err(Error::invalid("dots.base_size", "must be >= 0"));
        }
        if !(self.proximity_radius.is_finite() && self.proximity_radius > 0.0) {
            return Err(Error::invalid("dots.proximity_radius", "must be > 0"));
        }
        if !(self.max_scale.is_finite() && self.max_scale >= 0.0) {
            return Err(Error::invalid("dots.max_scale", "must be >= 0"));
        }
        for (field, k) in [("dots.size_smoothing", self.size_smoothing), ("dots.view_smoothing", self.view_smoothing)] {
            if !(k > 0.0 && k <= 1.0) {
                return Err(Error::invalid(field, "must be in (0, 1]"));
            }
        }
        if !(self.cull_margin.is_finite() && self.cull_margin >= 0.0) {
            return Err(Error::invalid("dots.cull_margin", "must be >= 0"));
        }
        Ok(())
    }
}

/// Radius a dot should have when the pointer is `distance` away.
/// Linear falloff: full boost at 0, none from `radius` on.
#[inline]
pub fn proximity_size(distance: f32, base: f32, radius: f32, max_scale: f32) -> f32 {
    if distance < radius {
        base * (1.0 + (1.0 - distance / radius) * max_scale)
    } else {
        base
    }
}

/// Largest zoom-out the lattice is built to cover; below `1 / MAX_COVERAGE` the edges show.
const MAX_COVERAGE: f32 = 8.0;

/// Lattice covering `width x height` with one spare cell on every side, so panning
/// by less than a cell never uncovers an edge. Empty for a non-positive spacing.
pub fn generate_grid(width: usize, height: usize, spacing: f32, base_size: f32) -> Vec<GridPoint> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Vec::new();
    }
    let cols = (width as f32 / spacing).ceil() as usize + 2;
    let rows = (height as f32 / spacing).ceil() as usize + 2;
    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let x = (col as f32 - 1.0) * spacing;
            let y = (row as f32 - 1.0) * spacing;
            points.push(GridPoint::at(x, y, base_size));
        }
    }
    points
}

/// Whole cells contained in `offset`. Removing them leaves the offset inside
/// (-spacing, spacing) without moving any dot on screen.
#[inline]
pub fn whole_cells(offset: f32, spacing: f32) -> f32 {
    offset - offset % spacing
}

/// How many viewports wide the lattice must be at `scale`: a power of two, at most `MAX_COVERAGE`.
fn coverage_for(scale: f32) -> f32 {
    if scale >= 1.0 {
        1.0
    } else {
        (1.0 / scale).log2().ceil().exp2().min(MAX_COVERAGE)
    }
}

pub struct DotField<S: Canvas> {
    id: ComponentId,
    surface: S,
    config: DotFieldConfig,
    points: Vec<GridPoint>,
    view: ViewTransform,
    // pushed position -> target offset; moves with drags and with each removed cell
    anchor: (f32, f32),
    coverage: f32,
    pointer: PointerState,
    frame: Option<FrameHandle>,
    listeners: Vec<ListenerId>,
}

impl<S: Canvas> DotField<S> {
    /// Attach to `surface` and start animating.
    /// A missing surface or an invalid config only logs a warning: the backdrop is
    /// decoration, the rest of the app carries on without it.
    pub fn init(
        host: &mut Host,
        surface: Option<S>,
        viewport: (usize, usize),
        config: DotFieldConfig,
    ) -> Option<Self> {
        let Some(mut surface) = surface else {
            log::warn!("dot field: no drawing surface, background disabled");
            return None;
        };
        if let Err(e) = config.validate() {
            log::warn!("dot field: {e}, background disabled");
            return None;
        }
        surface.resize(viewport.0, viewport.1);
        let points = generate_grid(viewport.0, viewport.1, config.spacing, config.base_size);
        log::info!(
            "dot field: {}x{} viewport, {} points (spacing {})",
            viewport.0, viewport.1, points.len(), config.spacing
        );
        log::debug!(
            "dot field: sizes settle within ~{} frames",
            crate::ease::frames_to_settle(config.size_smoothing.min(0.999), 0.01)
        );

        let mut field = Self {
            id: host.register_component(),
            surface,
            config,
            points,
            view: ViewTransform::default(),
            anchor: (0.0, 0.0),
            coverage: 1.0,
            pointer: PointerState::default(),
            frame: None,
            listeners: Vec::new(),
        };
        field.start(host);
        Some(field)
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    #[cfg(test)]
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    /// Subscribe to input and ask for the first frame. No-op while already running.
    pub fn start(&mut self, host: &mut Host) {
        if self.frame.is_some() {
            return;
        }
        self.listeners.push(host.listen(self.id, EventKind::Resize));
        self.listeners.push(host.listen(self.id, EventKind::PointerMove));
        self.frame = Some(host.request_frame(self.id));
    }

    /// Cancel the pending frame and drop every subscription. Safe to call repeatedly.
    pub fn cleanup(&mut self, host: &mut Host) {
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
            log::debug!("dot field: stopped");
        }
        for id in self.listeners.drain(..) {
            host.unlisten(id);
        }
    }

    /// Viewport changed: resize the surface and rebuild the whole lattice.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.surface.resize(width, height);
        self.coverage = coverage_for(self.view.scale);
        self.rebuild();
        log::debug!("dot field: resized to {width}x{height}, {} points", self.points.len());
    }

    fn rebuild(&mut self) {
        let (w, h) = self.surface.size();
        let c = self.coverage;
        let (w, h) = ((w as f32 * c).ceil() as usize, (h as f32 * c).ceil() as usize);
        self.points = generate_grid(w, h, self.config.spacing, self.config.base_size);
    }

    /// Drop whole cells from offset, target and anchor alike; the lattice looks the same.
    fn reduce_to_cell(&mut self) {
        let s = self.config.spacing;
        let v = &mut self.view;
        let (cx, cy) = (whole_cells(v.offset_x, s), whole_cells(v.offset_y, s));
        v.offset_x -= cx;
        v.target_offset_x -= cx;
        v.offset_y -= cy;
        v.target_offset_y -= cy;
        self.anchor.0 -= cx;
        self.anchor.1 -= cy;
    }

    /// Pointer position in surface pixels.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = PointerState { x, y };
    }

    /// Drag-pan. Follows the hand immediately and wraps per cell.
    /// The drag adds on top of a synced view: a glide still in flight keeps going,
    /// and later pushes land shifted by the dragged amount.
    pub fn shift(&mut self, dx: f32, dy: f32) {
        let v = &mut self.view;
        v.offset_x += dx;
        v.offset_y += dy;
        v.target_offset_x += dx;
        v.target_offset_y += dy;
        self.anchor.0 += dx;
        self.anchor.1 += dy;
        self.reduce_to_cell();
    }

    /// Follow another view's camera. The target jumps, the grid glides after it.
    /// Whole cells are later dropped from both ends, so any distance stays covered.
    pub fn sync_view(&mut self, change: ViewChange) {
        if !(change.scale.is_finite() && change.scale > 0.0) {
            log::warn!("dot field: ignoring view change with scale {}", change.scale);
            return;
        }
        self.view.target_offset_x = change.position.0 + self.anchor.0;
        self.view.target_offset_y = change.position.1 + self.anchor.1;
        self.view.target_scale = change.scale;
        if let Some((fx, fy)) = change.focus_point {
            log::trace!("dot field: view focus at ({fx:.1}, {fy:.1})");
        }
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.config.palette = palette;
    }

    /// Steps 1–4 of a frame: view smoothing, drift, proximity targets, size smoothing.
    pub fn update(&mut self, elapsed_secs: f32) {
        let k_pos = self.config.view_smoothing;
        let v = &mut self.view;
        approach(&mut v.offset_x, v.target_offset_x, k_pos);
        approach(&mut v.offset_y, v.target_offset_y, k_pos);
        approach(&mut v.scale, v.target_scale, k_pos);
        self.reduce_to_cell();
        if self.view.scale * self.coverage < 1.0 && self.coverage < MAX_COVERAGE {
            self.coverage = coverage_for(self.view.scale);
            self.rebuild();
            log::debug!("dot field: zoomed out to {:.2}, {} points", self.view.scale, self.points.len());
        }

        let cfg = &self.config;
        let view = self.view;
        let pointer = self.pointer;
        for (i, p) in self.points.iter_mut().enumerate() {
            if cfg.drift.enabled {
                let (ox, oy) = cfg.drift.offset(i, elapsed_secs);
                p.x = p.base_x + ox;
                p.y = p.base_y + oy;
            } else {
                p.x = p.base_x;
                p.y = p.base_y;
            }

            let (sx, sy) = view.to_screen(p.x, p.y);
            let distance = ((sx - pointer.x).powi(2) + (sy - pointer.y).powi(2)).sqrt();
            p.target_size = proximity_size(distance, cfg.base_size, cfg.proximity_radius, cfg.max_scale);
            approach(&mut p.size, p.target_size, cfg.size_smoothing);
        }
    }

    /// Screen position and radius of every dot worth drawing this frame.
    pub fn visible_dots(&self) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
        let (w, h) = self.surface.size();
        let m = self.config.cull_margin;
        let (max_x, max_y) = (w as f32 + m, h as f32 + m);
        self.points.iter().filter_map(move |p| {
            let (sx, sy) = self.view.to_screen(p.x, p.y);
            (sx >= -m && sx <= max_x && sy >= -m && sy <= max_y).then_some((sx, sy, p.size))
        })
    }

    /// Step 5: repaint the surface.
    pub fn render(&mut self) {
        let palette = self.config.palette;
        let dots: Vec<_> = self.visible_dots().collect();
        self.surface.clear(Some(palette.background()));
        for (x, y, r) in dots {
            self.surface.fill_circle(x, y, r, palette.dot());
        }
    }

    /// One animation frame, then ask for the next.
    pub fn tick(&mut self, host: &mut Host, elapsed_secs: f32) {
        if self.frame.take().is_none() {
            return; // torn down between request and delivery
        }
        self.update(elapsed_secs);
        self.render();
        self.frame = Some(host.request_frame(self.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameBuffer;
    use pretty_assertions::assert_eq;

    /// Canvas that remembers what was drawn instead of rasterising.
    #[derive(Default)]
    struct Recorder {
        size: (usize, usize),
        clears: usize,
        circles: Vec<(f32, f32, f32, Color)>,
    }

    impl Canvas for Recorder {
        fn size(&self) -> (usize, usize) { self.size }
        fn resize(&mut self, w: usize, h: usize) { self.size = (w, h); }
        fn clear(&mut self, _: Option<Color>) { self.clears += 1; self.circles.clear(); }
        fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, c: Color) { self.circles.push((cx, cy, r, c)); }
    }

    fn still() -> DotFieldConfig {
        DotFieldConfig { drift: Drift { enabled: false, ..Drift::default() }, ..DotFieldConfig::default() }
    }

    fn field(w: usize, h: usize, cfg: DotFieldConfig) -> (Host, DotField<Recorder>) {
        let mut host = Host::new();
        let f = DotField::init(&mut host, Some(Recorder::default()), (w, h), cfg).unwrap();
        (host, f)
    }

    #[test]
    fn no_boost_at_or_beyond_radius() {
        for d in [150.0, 150.01, 300.0, 1e6, f32::INFINITY] {
            assert_eq!(proximity_size(d, 1.5, 150.0, 2.5), 1.5);
        }
    }

    #[test]
    fn full_boost_at_zero() {
        assert_eq!(proximity_size(0.0, 1.5, 150.0, 2.5), 1.5 * 3.5);
    }

    #[test]
    fn falloff_is_monotone_and_continuous() {
        let mut prev = proximity_size(0.0, 2.0, 150.0, 2.5);
        for step in 1..=1500 {
            let d = step as f32 * 0.1;
            let s = proximity_size(d, 2.0, 150.0, 2.5);
            assert!(s <= prev, "grew at d={d}");
            assert!(prev - s < 0.01, "jump at d={d}");
            prev = s;
        }
        assert!((prev - 2.0).abs() < 1e-6);
    }

    #[test]
    fn grid_500_by_500_has_144_points() {
        assert_eq!(generate_grid(500, 500, 50.0, 1.5).len(), 144);
        assert_eq!(generate_grid(501, 480, 50.0, 1.5).len(), 13 * 12);
    }

    #[test]
    fn grid_covers_surface_within_one_cell() {
        let (w, h, s) = (333usize, 217usize, 40.0f32);
        let grid = generate_grid(w, h, s, 1.0);
        let mut y = 0.0;
        while y <= h as f32 {
            let mut x = 0.0;
            while x <= w as f32 {
                let near = grid.iter().any(|p| (p.base_x - x).abs().max((p.base_y - y).abs()) <= s);
                assert!(near, "({x}, {y}) uncovered");
                x += 7.3;
            }
            y += 7.3;
        }
        let min_x = grid.iter().map(|p| p.base_x).fold(f32::INFINITY, f32::min);
        assert_eq!(min_x, -s);
    }

    #[test]
    fn resize_regenerates_whole_grid() {
        let (_, mut f) = field(500, 500, still());
        f.pointer_moved(0.0, 0.0);
        f.update(0.0);
        f.resize(100, 50);
        assert_eq!(f.points().len(), 4 * 3);
        assert!(f.points().iter().all(|p| p.size == 1.5 && p.x == p.base_x));
        assert_eq!(f.surface().size(), (100, 50));
    }

    #[test]
    fn drag_offset_stays_within_a_cell() {
        let (_, mut f) = field(200, 200, still());
        let deltas = [37.0, 49.9, -120.5, 260.0, -0.1, 1e4, -3333.3, 12.25];
        for (i, d) in deltas.iter().cycle().take(400).enumerate() {
            f.shift(*d, -d * (i as f32 % 3.0));
            let v = f.view();
            assert!(v.offset_x.abs() < 50.0 && v.offset_y.abs() < 50.0, "{v:?}");
        }
    }

    #[test]
    fn synced_view_glides_to_the_same_lattice_phase() {
        let (_, mut f) = field(200, 200, still());
        f.sync_view(ViewChange { position: (1234.0, -80.0), scale: 2.0, focus_point: None });
        assert_eq!(f.view().target_offset_x, 1234.0);
        f.update(0.0);
        let v = *f.view();
        // 5% of the way there, minus the one whole cell already passed
        assert!((v.offset_x - (61.7 - 50.0)).abs() < 1e-3, "{v:?}");
        assert_eq!(v.target_offset_x, 1184.0);
        for _ in 0..400 {
            f.update(0.0);
        }
        let v = f.view();
        assert!((v.offset_x - 34.0).abs() < 0.01, "{v:?}");
        assert!((v.offset_y + 30.0).abs() < 0.01, "{v:?}");
        assert!((v.scale - 2.0).abs() < 1e-3);
    }

    #[test]
    fn far_sync_keeps_viewport_covered() {
        let (_, mut f) = field(200, 200, still());
        let full = {
            f.update(0.0);
            f.visible_dots().count()
        };
        f.sync_view(ViewChange { position: (300.0, 0.0), scale: 1.0, focus_point: None });
        for _ in 0..200 {
            f.update(0.0);
            assert!(f.view().offset_x.abs() < 50.0);
            // a 200px window always shows four or five columns of five rows
            assert!(f.visible_dots().count() >= 20, "{:?}", f.view());
        }
        assert_eq!(full, 25);
        let v = f.view();
        assert!((v.target_offset_x - v.offset_x).abs() < 0.05, "{v:?}");
    }

    #[test]
    fn repeated_pushes_do_not_glide_back() {
        let (_, mut f) = field(200, 200, still());
        let mut pos = 0.0;
        for _ in 0..120 {
            pos += 8.0;
            f.sync_view(ViewChange { position: (pos, 0.0), scale: 1.0, focus_point: None });
            f.update(0.0);
        }
        // only the glide lag separates them, not the whole distance pushed so far
        let v = *f.view();
        assert!(v.target_offset_x - v.offset_x < 200.0, "{v:?}");
        for _ in 0..400 {
            f.update(0.0);
        }
        assert!((f.view().offset_x - pos % 50.0).abs() < 0.01, "{:?}", f.view());
    }

    #[test]
    fn zoom_out_widens_the_lattice() {
        let (_, mut f) = field(200, 200, still());
        f.sync_view(ViewChange { position: (0.0, 0.0), scale: 0.25, focus_point: None });
        for _ in 0..400 {
            f.update(0.0);
        }
        let dots: Vec<_> = f.visible_dots().collect();
        let max_x = dots.iter().map(|d| d.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = dots.iter().map(|d| d.1).fold(f32::NEG_INFINITY, f32::max);
        let cell = 50.0 * 0.25;
        assert!(max_x >= 200.0 - cell && max_y >= 200.0 - cell, "({max_x}, {max_y})");
        assert_eq!(coverage_for(0.25), 4.0);
        assert_eq!(coverage_for(1e-6), MAX_COVERAGE);
    }

    #[test]
    fn drag_keeps_a_pending_glide() {
        let (_, mut f) = field(200, 200, still());
        f.sync_view(ViewChange { position: (100.0, 0.0), scale: 1.0, focus_point: None });
        f.shift(10.0, 0.0);
        assert_eq!(f.view().offset_x, 10.0);
        for _ in 0..400 {
            f.update(0.0);
        }
        // 100 + 10, less two whole cells
        assert!((f.view().offset_x - 10.0).abs() < 0.01, "{:?}", f.view());
        // re-pushing the same camera keeps the drag
        f.sync_view(ViewChange { position: (100.0, 0.0), scale: 1.0, focus_point: None });
        assert!((f.view().target_offset_x - f.view().offset_x).abs() < 0.01);
    }

    #[test]
    fn bad_scale_is_ignored() {
        let (_, mut f) = field(200, 200, still());
        f.sync_view(ViewChange { position: (5.0, 5.0), scale: 0.0, focus_point: Some((1.0, 1.0)) });
        assert_eq!(f.view(), &ViewTransform::default());
    }

    #[test]
    fn size_lags_behind_target() {
        let (_, mut f) = field(500, 500, still());
        // point index 1*12+1 sits on (0, 0)
        f.pointer_moved(0.0, 0.0);
        f.update(0.0);
        let p = f.points()[13];
        assert_eq!((p.base_x, p.base_y), (0.0, 0.0));
        assert_eq!(p.target_size, 1.5 * 3.5);
        assert!(p.size > 1.5 && p.size < p.target_size);
        for _ in 0..60 {
            f.update(0.0);
        }
        assert!((f.points()[13].size - 5.25).abs() < 0.01);
    }

    #[test]
    fn drift_stays_within_amplitude() {
        let (_, mut f) = field(300, 300, DotFieldConfig::default());
        for frame in 0..50 {
            f.update(frame as f32 / 60.0);
            for p in f.points() {
                assert!((p.x - p.base_x).abs() <= 3.0 + 1e-4);
                assert!((p.y - p.base_y).abs() <= 3.0 + 1e-4);
            }
        }
        // neighbours do not move in lockstep
        let p = f.points();
        assert!((p[0].x - p[0].base_x - (p[1].x - p[1].base_x)).abs() > 1e-3);
    }

    #[test]
    fn offscreen_dots_are_culled() {
        let (_, mut f) = field(100, 100, still());
        f.update(0.0);
        // overscan row/col at -50 lies beyond the 10px margin
        assert_eq!(f.visible_dots().count(), 3 * 3);
        f.render();
        assert_eq!(f.surface().circles.len(), 9);
        assert!(f.surface().circles.iter().all(|c| c.3 == Palette::Dark.dot()));
    }

    #[test]
    fn light_palette_changes_dot_color() {
        let (_, mut f) = field(100, 100, still());
        f.set_palette(Palette::Dark.toggled());
        f.render();
        assert!(f.surface().circles.iter().all(|c| c.3 == Palette::Light.dot()));
    }

    #[test]
    fn tick_reschedules_itself() {
        let (mut host, mut f) = field(100, 100, still());
        for _ in 0..3 {
            assert_eq!(host.take_due_frames(), vec![f.id()]);
            f.tick(&mut host, 0.0);
        }
        assert_eq!(f.surface().clears, 3);
        assert!(host.has_pending_frame(f.id()));
    }

    #[test]
    fn invalid_config_soft_fails() {
        let mut host = Host::new();
        for cfg in [
            DotFieldConfig { spacing: 0.0, ..still() },
            DotFieldConfig { spacing: f32::NAN, ..still() },
            DotFieldConfig { size_smoothing: 0.0, ..still() },
        ] {
            let f = DotField::init(&mut host, Some(Recorder::default()), (100, 100), cfg);
            assert!(f.is_none());
        }
        assert!(host.take_due_frames().is_empty());
        assert!(generate_grid(100, 100, 0.0, 1.0).is_empty());
        assert!(generate_grid(100, 100, -5.0, 1.0).is_empty());
    }

    #[test]
    fn missing_surface_soft_fails() {
        let mut host = Host::new();
        let f: Option<DotField<FrameBuffer>> = DotField::init(&mut host, None, (10, 10), still());
        assert!(f.is_none());
        assert!(host.take_due_frames().is_empty());
    }

    #[test]
    fn cleanup_twice_is_harmless() {
        let (mut host, mut f) = field(100, 100, still());
        assert_eq!(host.listener_count(f.id()), 2);
        f.cleanup(&mut host);
        f.cleanup(&mut host);
        assert!(!f.is_running());
        assert!(!host.has_pending_frame(f.id()));
        assert_eq!(host.listener_count(f.id()), 0);
        // a stale delivery after teardown draws nothing and does not re-arm
        f.tick(&mut host, 0.0);
        assert_eq!(f.surface().clears, 0);
        assert!(!host.has_pending_frame(f.id()));
    }

    #[test]
    fn restart_after_cleanup() {
        let (mut host, mut f) = field(100, 100, still());
        f.cleanup(&mut host);
        f.start(&mut host);
        f.start(&mut host);
        assert!(f.is_running());
        assert_eq!(host.listener_count(f.id()), 2);
        assert_eq!(host.take_due_frames(), vec![f.id()]);
    }

    #[test]
    fn config_validation() {
        assert!(DotFieldConfig::default().validate().is_ok());
        let bad = DotFieldConfig { spacing: 0.0, ..DotFieldConfig::default() };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig { field: "dots.spacing", .. })));
        let bad = DotFieldConfig { size_smoothing: 1.5, ..DotFieldConfig::default() };
        assert!(bad.validate().is_err());
    }
}
