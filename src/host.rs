// The host side of the frame loop: "call me before the next repaint" requests and
// event subscriptions. Components never loop on their own; they ask the host for one
// more frame at the end of every tick, and the window loop in main.rs drains them.

/// Identifies one animating component (a dot field, a halftone, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentId(u32);

/// A pending frame request; hand it back to `cancel_frame` to drop it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(u64);

/// A registered event subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Resize,
    PointerMove,
    PointerLeave,
}

struct Listener {
    id: ListenerId,
    owner: ComponentId,
    kind: EventKind,
}

#[derive(Default)]
pub struct Host {
    next_component: u32,
    next_handle: u64,
    frames: Vec<(FrameHandle, ComponentId)>,
    listeners: Vec<Listener>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_component(&mut self) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        id
    }

    fn bump(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Ask for `owner` to be ticked on the next frame.
    pub fn request_frame(&mut self, owner: ComponentId) -> FrameHandle {
        let handle = FrameHandle(self.bump());
        self.frames.push((handle, owner));
        handle
    }

    /// Drop a pending request. Unknown or already-fired handles are ignored.
    pub fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|(h, _)| *h != handle);
    }

    /// Take every request due this frame. Requests made while ticking land in the next one.
    pub fn take_due_frames(&mut self) -> Vec<ComponentId> {
        self.frames.drain(..).map(|(_, owner)| owner).collect()
    }

    #[cfg(test)]
    pub fn has_pending_frame(&self, owner: ComponentId) -> bool {
        self.frames.iter().any(|(_, o)| *o == owner)
    }

    pub fn listen(&mut self, owner: ComponentId, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.bump());
        self.listeners.push(Listener { id, owner, kind });
        id
    }

    pub fn unlisten(&mut self, id: ListenerId) {
        self.listeners.retain(|l| l.id != id);
    }

    pub fn is_listening(&self, owner: ComponentId, kind: EventKind) -> bool {
        self.listeners.iter().any(|l| l.owner == owner && l.kind == kind)
    }

    #[cfg(test)]
    pub fn listener_count(&self, owner: ComponentId) -> usize {
        self.listeners.iter().filter(|l| l.owner == owner).count()
    }
}
