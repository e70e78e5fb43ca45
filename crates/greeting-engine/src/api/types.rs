/// One of the two audio channels on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Ambient track that plays from page load until the switch point.
    Background,
    /// Main track that takes over mid-timeline.
    Main,
}

impl Channel {
    /// DOM id of the `<audio>` element backing this channel.
    pub fn element_id(self) -> &'static str {
        match self {
            Channel::Background => "background-audio",
            Channel::Main => "audio",
        }
    }
}

/// Kind of user gesture the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Click,
    TouchStart,
}

impl GestureKind {
    /// DOM event name for this gesture.
    pub fn event_name(self) -> &'static str {
        match self {
            GestureKind::Click => "click",
            GestureKind::TouchStart => "touchstart",
        }
    }
}

/// Where a gesture landed. Gestures on nested targets bubble to `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureTarget {
    Document,
    /// The `#audio-overlay` element or any of its children.
    Overlay,
    /// The `#replay` control.
    Replay,
}

/// Handle returned by every timer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

/// Handle returned by every listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

/// Outcome of a play request, reported back by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayResult {
    Started,
    /// The platform refused to start playback (autoplay policy, abort, ...).
    Rejected,
}
