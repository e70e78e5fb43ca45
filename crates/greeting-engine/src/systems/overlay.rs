//! Audio-unlock overlay.
//!
//! Holds the timeline back until the user interacts with the overlay, then
//! counts down on a fixed tick while the main track is primed, and finally
//! hides itself and tells the page to start the timeline.

use crate::api::context::{HostCommand, HostContext, ListenerAction, TimerAction};
use crate::api::types::{GestureKind, GestureTarget, ListenerId, TimerId};
use crate::audio::AudioController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Visible, nothing armed yet.
    Idle,
    /// Visible, waiting for the first click or touch on the overlay.
    AwaitingGesture,
    /// Showing the remaining count.
    CountingDown(u32),
    /// Hidden; the timeline has been started.
    Released,
}

pub struct UnlockOverlay {
    state: OverlayState,
    countdown_from: u32,
    tick_ms: f64,
    idle_prompt: String,
    listener: Option<ListenerId>,
    timer: Option<TimerId>,
}

impl UnlockOverlay {
    pub fn new(countdown_from: u32, tick_ms: f64, idle_prompt: impl Into<String>) -> Self {
        Self {
            state: OverlayState::Idle,
            countdown_from,
            tick_ms,
            idle_prompt: idle_prompt.into(),
            listener: None,
            timer: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Show the idle prompt and wait for a gesture on the overlay.
    pub fn arm(&mut self, ctx: &mut HostContext) {
        if self.state != OverlayState::Idle {
            return;
        }
        ctx.emit(HostCommand::OverlayText(self.idle_prompt.clone()));
        ctx.emit(HostCommand::OverlayVisible(true));
        self.listener = Some(ctx.listen_once(
            GestureTarget::Overlay,
            &[GestureKind::Click, GestureKind::TouchStart],
            ListenerAction::OverlayGesture,
        ));
        self.state = OverlayState::AwaitingGesture;
    }

    /// The overlay listener fired. Returns true if the overlay released
    /// immediately (a countdown of zero).
    pub fn on_gesture(&mut self, audio: &mut AudioController, ctx: &mut HostContext) -> bool {
        if self.state != OverlayState::AwaitingGesture {
            return false;
        }
        self.listener = None;
        audio.resume_background(ctx);
        audio.unlock_main(ctx);

        if self.countdown_from == 0 {
            self.release(ctx);
            return true;
        }
        self.state = OverlayState::CountingDown(self.countdown_from);
        ctx.emit(HostCommand::OverlayText(self.countdown_from.to_string()));
        self.timer = Some(ctx.set_interval(self.tick_ms, TimerAction::CountdownTick));
        false
    }

    /// One countdown tick. Returns true when the overlay has just released.
    pub fn on_tick(&mut self, ctx: &mut HostContext) -> bool {
        let OverlayState::CountingDown(n) = self.state else {
            return false;
        };
        let n = n.saturating_sub(1);
        if n > 0 {
            self.state = OverlayState::CountingDown(n);
            ctx.emit(HostCommand::OverlayText(n.to_string()));
            return false;
        }
        self.release(ctx);
        true
    }

    fn release(&mut self, ctx: &mut HostContext) {
        if let Some(id) = self.timer.take() {
            ctx.clear_timer(id);
        }
        ctx.emit(HostCommand::OverlayVisible(false));
        ctx.emit(HostCommand::OverlayText(self.idle_prompt.clone()));
        self.state = OverlayState::Released;
        log::info!("audio unlock overlay released");
    }

    /// Drop the gesture listener and countdown timer, if still registered.
    pub fn dispose(&mut self, ctx: &mut HostContext) {
        if let Some(id) = self.listener.take() {
            ctx.unlisten(id);
        }
        if let Some(id) = self.timer.take() {
            ctx.clear_timer(id);
        }
    }
}
