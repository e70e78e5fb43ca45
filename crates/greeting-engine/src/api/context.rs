use crate::api::types::{Channel, GestureKind, GestureTarget, ListenerId, TimerId};
use crate::core::clock::TimerQueue;
use crate::core::listeners::ListenerRegistry;

/// An operation on one `<audio>` element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioOp {
    /// Call `play()`. The host reports the outcome with the same `request` id.
    Play { request: u32 },
    Pause,
    /// Set `currentTime` to 0.
    Rewind,
    SetMuted(bool),
    SetVolume(f32),
}

/// A side effect the host must perform, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Audio { channel: Channel, op: AudioOp },
    /// Replace the inner HTML of the first element matching `selector`.
    SetInnerHtml { selector: String, html: String },
    OverlayVisible(bool),
    /// Replace the text of the overlay's `.overlay-content` child.
    OverlayText(String),
    /// Add (`present`) or remove a class on an element looked up by id.
    ImageClass { element_id: String, class: String, present: bool },
    ImageSource { element_id: String, uri: String },
    /// Load `uri` off-screen; report back with `generation`.
    Preload { uri: String, generation: u32 },
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    StartTimeline,
    CountdownTick,
    GalleryAdvance,
    GallerySwap { generation: u32 },
    GalleryReveal { generation: u32 },
}

/// What a gesture listener does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    RetryPlay(Channel),
    OverlayGesture,
    Replay,
}

/// Shared mutable host-facing state: the command buffer plus every timer and
/// listener registration. Components borrow it alongside their own state.
pub struct HostContext {
    pub timers: TimerQueue<TimerAction>,
    pub listeners: ListenerRegistry<ListenerAction>,
    commands: Vec<HostCommand>,
}

impl HostContext {
    pub fn new() -> Self {
        Self {
            timers: TimerQueue::new(),
            listeners: ListenerRegistry::new(),
            commands: Vec::new(),
        }
    }

    /// Queue a command for the host.
    pub fn emit(&mut self, command: HostCommand) {
        self.commands.push(command);
    }

    /// Queue an audio operation.
    pub fn audio(&mut self, channel: Channel, op: AudioOp) {
        self.emit(HostCommand::Audio { channel, op });
    }

    pub fn set_timeout(&mut self, delay_ms: f64, action: TimerAction) -> TimerId {
        self.timers.set_timeout(delay_ms, action)
    }

    pub fn set_interval(&mut self, interval_ms: f64, action: TimerAction) -> TimerId {
        self.timers.set_interval(interval_ms, action)
    }

    pub fn clear_timer(&mut self, id: TimerId) {
        self.timers.clear(id);
    }

    pub fn listen_once(&mut self, target: GestureTarget, kinds: &[GestureKind], action: ListenerAction) -> ListenerId {
        self.listeners.add_once(target, kinds, action)
    }

    pub fn listen(&mut self, target: GestureTarget, kinds: &[GestureKind], action: ListenerAction) -> ListenerId {
        self.listeners.add(target, kinds, action)
    }

    pub fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    /// Take all queued commands.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands queued but not yet drained.
    pub fn pending_commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Dispose every outstanding timer and listener.
    pub fn dispose_all(&mut self) {
        self.timers.clear_all();
        self.listeners.clear();
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}
