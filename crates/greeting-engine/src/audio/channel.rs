use crate::api::context::{AudioOp, HostContext};
use crate::api::types::{Channel, ListenerId};

/// Why a play request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIntent {
    /// Real playback the listener should hear.
    Audible,
    /// Muted play/pause cycle that primes the element's autoplay permission.
    Unlock,
}

/// A play request the host has not reported on yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPlay {
    pub request: u32,
    pub intent: PlayIntent,
}

/// Core-side mirror of one `<audio>` element. Every mutation is also queued
/// as a host command, so this state and the element stay in step.
#[derive(Debug, Clone)]
pub struct AudioChannel {
    pub channel: Channel,
    pub muted: bool,
    /// 0.0 – 1.0
    pub volume: f32,
    /// True once the host confirmed playback started, false after a pause.
    pub playing: bool,
    /// Last position the core set, in seconds.
    pub position: f64,
    pub pending: Option<PendingPlay>,
    /// Outstanding retry-on-gesture listener, if playback was refused.
    pub retry: Option<ListenerId>,
}

impl AudioChannel {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            muted: false,
            volume: 1.0,
            playing: false,
            position: 0.0,
            pending: None,
            retry: None,
        }
    }

    /// Playing, unmuted, and not silent.
    pub fn is_audible(&self) -> bool {
        self.playing && !self.muted && self.volume > 0.0
    }

    pub(crate) fn set_muted(&mut self, muted: bool, ctx: &mut HostContext) {
        self.muted = muted;
        ctx.audio(self.channel, AudioOp::SetMuted(muted));
    }

    pub(crate) fn set_volume(&mut self, volume: f32, ctx: &mut HostContext) {
        self.volume = volume.clamp(0.0, 1.0);
        ctx.audio(self.channel, AudioOp::SetVolume(self.volume));
    }

    pub(crate) fn request_play(&mut self, request: u32, intent: PlayIntent, ctx: &mut HostContext) {
        self.pending = Some(PendingPlay { request, intent });
        ctx.audio(self.channel, AudioOp::Play { request });
    }

    /// Pause. Any pending play request is abandoned; its outcome will be ignored.
    pub(crate) fn pause(&mut self, ctx: &mut HostContext) {
        self.playing = false;
        self.pending = None;
        ctx.audio(self.channel, AudioOp::Pause);
    }

    pub(crate) fn rewind(&mut self, ctx: &mut HostContext) {
        self.position = 0.0;
        ctx.audio(self.channel, AudioOp::Rewind);
    }

    /// Drop the retry listener, if any.
    pub(crate) fn dispose_retry(&mut self, ctx: &mut HostContext) {
        if let Some(id) = self.retry.take() {
            ctx.unlisten(id);
        }
    }
}
