// Every picture on the page, each with its own halftone.
// Visual: a row of panels; only the one under the mouse reacts, the others sit still.
//
// Each effect is its own component on the shared host, with its own frames,
// listeners and pointer, so panels never step on each other.

use std::path::PathBuf;

use crate::draw::blit_scaled;
use crate::halftone::{HalftoneConfig, HalftoneEffect, HalftonePatch};
use crate::host::{ComponentId, EventKind, Host};
use crate::panel::{ImagePanel, Shelf};
use crate::types::FrameBuffer;

struct Slot {
    panel: ImagePanel,
    effect: Option<HalftoneEffect>,
    hovered: bool,
}

pub struct Gallery {
    slots: Vec<Slot>,
    config: HalftoneConfig, // used for every (re)created effect
}

impl Gallery {
    pub fn new(config: HalftoneConfig) -> Self {
        Self { slots: Vec::new(), config }
    }

    /// Load every picture and put a halftone on it. A picture that fails to load
    /// is logged and skipped; the rest still show.
    pub fn open(host: &mut Host, paths: &[PathBuf], shelf: &mut Shelf, config: HalftoneConfig) -> Self {
        let mut gallery = Self::new(config);
        for path in paths {
            match ImagePanel::open(path, |w, h| shelf.place(w, h)) {
                Ok(panel) => {
                    gallery.add(host, panel);
                }
                Err(e) => log::error!("{e}"),
            }
        }
        log::info!("gallery: {} of {} pictures shown", gallery.shown(), paths.len());
        gallery
    }

    /// Take over `panel` with a new effect. Returns the effect's id, if it started.
    pub fn add(&mut self, host: &mut Host, mut panel: ImagePanel) -> Option<ComponentId> {
        let effect = HalftoneEffect::create(host, Some(&mut panel), self.config.clone());
        let id = effect.as_ref().map(HalftoneEffect::id);
        self.slots.push(Slot { panel, effect, hovered: false });
        id
    }

    pub fn shown(&self) -> usize {
        self.slots.len()
    }

    /// Route the window pointer: the panel under it gets a move, a panel it just left
    /// gets a leave, everything else hears nothing.
    pub fn pointer(&mut self, host: &Host, mouse: Option<(f32, f32)>) {
        for slot in &mut self.slots {
            let inside = mouse.is_some_and(|(mx, my)| slot.panel.rect.contains(mx, my));
            if let Some(fx) = slot.effect.as_mut() {
                match mouse {
                    Some((mx, my)) if inside && host.is_listening(fx.id(), EventKind::PointerMove) => {
                        let (nx, ny) = slot.panel.rect.normalize(mx, my);
                        fx.update_from_pointer(nx, ny);
                    }
                    _ if slot.hovered && !inside && host.is_listening(fx.id(), EventKind::PointerLeave) => {
                        fx.pointer_leave();
                    }
                    _ => {}
                }
            }
            slot.hovered = inside;
        }
    }

    /// Deliver a due frame. False if no effect here owns `id`.
    pub fn tick(&mut self, host: &mut Host, id: ComponentId) -> bool {
        let owner = self.slots.iter_mut().filter_map(|s| s.effect.as_mut()).find(|fx| fx.id() == id);
        match owner {
            Some(fx) => {
                fx.tick(host);
                true
            }
            None => false,
        }
    }

    /// Flip every effect between following the mouse and rendering once.
    pub fn toggle_interactive(&mut self, host: &mut Host) {
        let patch = HalftonePatch { interactive: Some(!self.config.interactive), ..HalftonePatch::default() };
        match self.config.apply(&patch) {
            Ok(cfg) => self.config = cfg,
            Err(e) => {
                log::warn!("{e}");
                return;
            }
        }
        for fx in self.slots.iter_mut().filter_map(|s| s.effect.as_mut()) {
            if let Err(e) = fx.update_config(host, &patch) {
                log::warn!("{e}");
            }
        }
    }

    /// Remove every live effect, or bring them all back when none is live.
    pub fn toggle_effects(&mut self, host: &mut Host) {
        if self.any_live() {
            self.destroy_all(host); // Visual: the original pictures come back
            return;
        }
        for slot in &mut self.slots {
            slot.effect = HalftoneEffect::create(host, Some(&mut slot.panel), self.config.clone());
        }
    }

    fn any_live(&self) -> bool {
        self.slots.iter().any(|s| s.effect.as_ref().is_some_and(|fx| !fx.is_destroyed()))
    }

    /// Draw each panel: its halftone, or the original picture while no effect covers it.
    pub fn compose(&self, screen: &mut FrameBuffer) {
        for slot in &self.slots {
            if slot.panel.source_visible {
                blit_scaled(screen, &slot.panel.preview, slot.panel.rect);
            }
            if let Some(fx) = slot.effect.as_ref() {
                if let Some(surface) = fx.surface() {
                    blit_scaled(screen, surface, fx.rect());
                }
            }
        }
    }

    pub fn destroy_all(&mut self, host: &mut Host) {
        for slot in &mut self.slots {
            if let Some(fx) = slot.effect.as_mut() {
                fx.destroy(host, &mut slot.panel);
            }
        }
    }
}
