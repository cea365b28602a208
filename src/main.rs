// What you SEE:
// • A dark backdrop of small dots; dots near the mouse swell and settle back.
// • Drag with the left mouse to pan the grid; arrows pan / + - zoom it the way an
//   external graph view would push its camera.
// • Each --image sits in its own panel as a halftone; the one under the mouse reacts.
// • L toggles light/dark, I toggles interactive halftones, H removes/restores them. ESC quits.

mod config;
mod dotfield;
mod draw;
mod ease;
mod error;
mod gallery;
mod halftone;
mod host;
mod panel;
mod types;

use clap::Parser;
use config::{AppConfig, Args};
use dotfield::DotField;
use draw::{blit_scaled, Drawer};
use error::Error;
use gallery::Gallery;
use host::{EventKind, Host};
use minifb::Key;
use panel::{PanelRect, Shelf};
use std::time::{Duration, Instant};
use types::{FrameBuffer, ViewChange};

const VIEW_PAN_STEP: f32 = 8.0; // px per frame while an arrow is held
const VIEW_ZOOM_STEP: f32 = 1.02; // per frame while + or - is held

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();
    let cfg = AppConfig::from_args(&args)?;
    let halftone_cfg = cfg.halftone_config()?;

    /* --- Window + host ---
       Visual: an empty window opens; nothing animates until a component asks for frames. */
    let mut drawer = Drawer::new(&cfg.window.title, cfg.window.width, cfg.window.height)?;
    let mut host = Host::new();
    let (mut win_w, mut win_h) = drawer.size();
    let mut screen = FrameBuffer::new(win_w, win_h);

    /* --- Backdrop ---
       Visual: the dot grid fills the whole window. */
    let mut background = DotField::init(
        &mut host,
        Some(FrameBuffer::new(win_w, win_h)),
        (win_w, win_h),
        cfg.dots.clone(),
    );
    let mut palette = cfg.dots.palette;

    /* --- Halftone panels ---
       Visual: the pictures line up from the top-left, each replaced by its dot screen. */
    let mut shelf = Shelf::new(cfg.window.panel_margin, cfg.window.panel_max, win_w);
    let mut gallery = Gallery::open(&mut host, &cfg.halftone.images, &mut shelf, halftone_cfg);

    /* --- Pointer / view state --- */
    let mut last_mouse: Option<(f32, f32)> = None;
    let mut drag_from: Option<(f32, f32)> = None;
    let mut pushed_view = ViewChange { position: (0.0, 0.0), scale: 1.0, focus_point: None };

    /* --- FPS --- */
    let started = Instant::now();
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Resize: the backdrop rebuilds its grid for the new window size. */
        let size = drawer.size();
        if size != (win_w, win_h) && size.0 > 0 && size.1 > 0 {
            (win_w, win_h) = size;
            screen.resize(win_w, win_h);
            if let Some(bg) = background.as_mut() {
                if host.is_listening(bg.id(), EventKind::Resize) {
                    bg.resize(win_w, win_h);
                }
            }
        }

        /* 2) Pointer: window pixels are the backdrop's surface pixels; each halftone
           gets the position normalized to its own panel. */
        let mouse = drawer.mouse_pos();
        if mouse != last_mouse {
            if let (Some((mx, my)), Some(bg)) = (mouse, background.as_mut()) {
                if host.is_listening(bg.id(), EventKind::PointerMove) {
                    bg.pointer_moved(mx, my);
                }
            }
            gallery.pointer(&host, mouse);
            last_mouse = mouse;
        }

        // Drag-pan: the grid follows the hand, on top of any pushed camera.
        match (drawer.left_mouse_down(), mouse) {
            (true, Some((mx, my))) => {
                if let (Some((px, py)), Some(bg)) = (drag_from, background.as_mut()) {
                    bg.shift(mx - px, my - py);
                }
                drag_from = Some((mx, my));
            }
            _ => drag_from = None,
        }

        /* 3) Keys */
        if let Some(bg) = background.as_mut() {
            if drawer.pressed_once(Key::L) {
                palette = palette.toggled();
                bg.set_palette(palette);
            }
            if step_pushed_view(&drawer, &mut pushed_view, mouse) {
                bg.sync_view(pushed_view);
            }
        }
        if drawer.pressed_once(Key::I) {
            gallery.toggle_interactive(&mut host);
        }
        if drawer.pressed_once(Key::H) {
            gallery.toggle_effects(&mut host);
        }

        /* 4) Deliver the frames components asked for. */
        let elapsed = started.elapsed().as_secs_f32();
        for id in host.take_due_frames() {
            if let Some(bg) = background.as_mut().filter(|bg| bg.id() == id) {
                bg.tick(&mut host, elapsed);
            } else if !gallery.tick(&mut host, id) {
                log::trace!("frame for unknown component {id:?}");
            }
        }

        /* 5) Compose: backdrop, then each panel (original picture or its halftone). */
        match background.as_ref() {
            Some(bg) => {
                let surface = bg.surface();
                if surface.width == screen.width && surface.height == screen.height {
                    screen.pixels.copy_from_slice(&surface.pixels);
                } else {
                    let full = PanelRect { x: 0, y: 0, width: screen.width, height: screen.height };
                    blit_scaled(&mut screen, surface, full);
                }
            }
            None => screen.fill(palette.background().to_argb()),
        }
        gallery.compose(&mut screen);

        drawer.present(&screen)?;

        /* 6) FPS counter (log once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            log::debug!("FPS: {:.1}", frames_this_second as f32 / secs);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    /* --- Teardown --- */
    if let Some(bg) = background.as_mut() {
        bg.cleanup(&mut host);
    }
    gallery.destroy_all(&mut host);
    Ok(())
}

/// Arrow keys / + - stand in for a pannable, zoomable view in front of the grid.
/// Returns true when the pushed camera changed this frame.
fn step_pushed_view(drawer: &Drawer, view: &mut ViewChange, mouse: Option<(f32, f32)>) -> bool {
    let before = *view;
    if drawer.key_down(Key::Left) { view.position.0 += VIEW_PAN_STEP; }
    if drawer.key_down(Key::Right) { view.position.0 -= VIEW_PAN_STEP; }
    if drawer.key_down(Key::Up) { view.position.1 += VIEW_PAN_STEP; }
    if drawer.key_down(Key::Down) { view.position.1 -= VIEW_PAN_STEP; }
    if drawer.key_down(Key::Equal) || drawer.key_down(Key::NumPadPlus) {
        view.scale = (view.scale * VIEW_ZOOM_STEP).min(4.0);
    }
    if drawer.key_down(Key::Minus) || drawer.key_down(Key::NumPadMinus) {
        view.scale = (view.scale / VIEW_ZOOM_STEP).max(0.25);
    }
    view.focus_point = mouse;
    view.position != before.position || view.scale != before.scale
}
