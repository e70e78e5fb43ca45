//! Two-channel audio controller with autoplay-rejection fallback.
//!
//! Constructed once by the page and handed by reference to the overlay, the
//! timeline's effect dispatch and the replay path. Play requests are
//! asynchronous: the controller queues a `Play` command and the host answers
//! through [`AudioController::play_settled`].

use crate::api::context::{HostContext, ListenerAction};
use crate::api::types::{Channel, GestureKind, GestureTarget, PlayResult};
use super::channel::{AudioChannel, PlayIntent};

pub struct AudioController {
    background: AudioChannel,
    main: AudioChannel,
    next_request: u32,
}

impl AudioController {
    pub fn new() -> Self {
        Self {
            background: AudioChannel::new(Channel::Background),
            main: AudioChannel::new(Channel::Main),
            next_request: 1,
        }
    }

    pub fn channel(&self, channel: Channel) -> &AudioChannel {
        match channel {
            Channel::Background => &self.background,
            Channel::Main => &self.main,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut AudioChannel {
        match channel {
            Channel::Background => &mut self.background,
            Channel::Main => &mut self.main,
        }
    }

    fn request_play(&mut self, channel: Channel, intent: PlayIntent, ctx: &mut HostContext) {
        let request = self.next_request;
        self.next_request += 1;
        self.channel_mut(channel).request_play(request, intent, ctx);
    }

    /// Unmute the background channel at full volume and request playback.
    /// A refusal arms a one-shot click/touch retry on the document.
    pub fn play_background(&mut self, ctx: &mut HostContext) {
        self.background.set_volume(1.0, ctx);
        self.background.set_muted(false, ctx);
        self.request_play(Channel::Background, PlayIntent::Audible, ctx);
    }

    /// Gesture-driven background start. The gesture itself carries activation,
    /// so any waiting retry listener is replaced by a direct attempt.
    pub fn resume_background(&mut self, ctx: &mut HostContext) {
        self.background.dispose_retry(ctx);
        if self.background.playing {
            if self.background.muted {
                self.background.set_muted(false, ctx);
            }
            return;
        }
        self.play_background(ctx);
    }

    /// Stop the background (pause + rewind) and start the main track audibly.
    /// A refusal arms a one-shot click retry on the document.
    pub fn switch_to_main(&mut self, ctx: &mut HostContext) {
        self.background.dispose_retry(ctx);
        self.background.pause(ctx);
        self.background.rewind(ctx);

        self.main.dispose_retry(ctx);
        self.main.set_volume(1.0, ctx);
        self.main.set_muted(false, ctx);
        self.request_play(Channel::Main, PlayIntent::Audible, ctx);
        log::info!("switched to main audio track");
    }

    /// Prime the main channel: muted play, then pause and rewind on success.
    /// Failure is swallowed.
    pub fn unlock_main(&mut self, ctx: &mut HostContext) {
        self.main.set_muted(true, ctx);
        self.request_play(Channel::Main, PlayIntent::Unlock, ctx);
    }

    /// Replay reset: main paused and rewound, background playing again.
    pub fn reset_for_replay(&mut self, ctx: &mut HostContext) {
        self.main.dispose_retry(ctx);
        self.main.pause(ctx);
        self.main.rewind(ctx);
        self.background.dispose_retry(ctx);
        self.play_background(ctx);
    }

    /// A retry listener fired. It has already removed itself.
    pub fn retry(&mut self, channel: Channel, ctx: &mut HostContext) {
        let ch = self.channel_mut(channel);
        ch.retry = None;
        if ch.playing {
            return;
        }
        log::debug!("retrying {:?} playback after user gesture", channel);
        self.request_play(channel, PlayIntent::Audible, ctx);
    }

    /// Host report for a play request. Outcomes for requests that are no
    /// longer pending are ignored.
    pub fn play_settled(&mut self, channel: Channel, request: u32, result: PlayResult, ctx: &mut HostContext) {
        let ch = self.channel_mut(channel);
        let Some(pending) = ch.pending.filter(|p| p.request == request) else {
            log::debug!("ignoring stale play outcome for {:?} (request {})", channel, request);
            return;
        };
        ch.pending = None;

        match (pending.intent, result) {
            (PlayIntent::Audible, PlayResult::Started) => {
                ch.playing = true;
            }
            (PlayIntent::Audible, PlayResult::Rejected) => {
                log::warn!("{:?} audio blocked by the browser; waiting for user interaction", channel);
                self.arm_retry(channel, ctx);
            }
            (PlayIntent::Unlock, PlayResult::Started) => {
                ch.pause(ctx);
                ch.rewind(ctx);
                log::debug!("main audio unlocked");
            }
            (PlayIntent::Unlock, PlayResult::Rejected) => {
                log::debug!("main audio unlock refused; continuing without it");
            }
        }
    }

    fn arm_retry(&mut self, channel: Channel, ctx: &mut HostContext) {
        let ch = self.channel_mut(channel);
        if ch.retry.is_some() {
            return;
        }
        let kinds: &[GestureKind] = match channel {
            Channel::Background => &[GestureKind::Click, GestureKind::TouchStart],
            Channel::Main => &[GestureKind::Click],
        };
        ch.retry = Some(ctx.listen_once(GestureTarget::Document, kinds, ListenerAction::RetryPlay(channel)));
    }

    /// The document came back from the back/forward cache, where the browser
    /// paused its media. Request playback again on every channel that was
    /// playing; a refusal falls back to the usual gesture retry.
    pub fn resume_after_restore(&mut self, ctx: &mut HostContext) {
        for channel in [Channel::Background, Channel::Main] {
            let ch = self.channel_mut(channel);
            if !ch.playing {
                continue;
            }
            ch.playing = false;
            self.request_play(channel, PlayIntent::Audible, ctx);
        }
    }

    /// Channels currently audible.
    pub fn audible(&self) -> Vec<Channel> {
        [&self.background, &self.main]
            .into_iter()
            .filter(|c| c.is_audible())
            .map(|c| c.channel)
            .collect()
    }

    /// Drop both retry listeners (teardown).
    pub fn dispose(&mut self, ctx: &mut HostContext) {
        self.background.dispose_retry(ctx);
        self.main.dispose_retry(ctx);
    }
}

impl Default for AudioController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::{AudioOp, HostCommand};

    /// Request id of the most recent `Play` queued for `channel`.
    fn last_play(ctx: &HostContext, channel: Channel) -> u32 {
        ctx.pending_commands()
            .iter()
            .rev()
            .find_map(|c| match c {
                HostCommand::Audio { channel: ch, op: AudioOp::Play { request } } if *ch == channel => Some(*request),
                _ => None,
            })
            .expect("no play request queued")
    }

    fn fire(ctx: &mut HostContext, audio: &mut AudioController, kind: GestureKind) {
        for id in ctx.listeners.matching(GestureTarget::Document, kind) {
            if let Some(ListenerAction::RetryPlay(ch)) = ctx.listeners.take(id) {
                audio.retry(ch, ctx);
            }
        }
    }

    #[test]
    fn background_plays_unmuted_at_full_volume() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.play_background(&mut ctx);

        let cmds = ctx.drain_commands();
        assert!(cmds.contains(&HostCommand::Audio { channel: Channel::Background, op: AudioOp::SetMuted(false) }));
        assert!(cmds.contains(&HostCommand::Audio { channel: Channel::Background, op: AudioOp::SetVolume(1.0) }));
        assert!(matches!(
            cmds.last(),
            Some(HostCommand::Audio { channel: Channel::Background, op: AudioOp::Play { .. } })
        ));
    }

    #[test]
    fn rejected_background_retries_on_first_gesture() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.play_background(&mut ctx);
        let req = last_play(&ctx, Channel::Background);
        audio.play_settled(Channel::Background, req, PlayResult::Rejected, &mut ctx);
        assert_eq!(ctx.listeners.len(), 1);

        // A touch fires the retry and removes the click half too.
        ctx.drain_commands();
        fire(&mut ctx, &mut audio, GestureKind::TouchStart);
        assert!(ctx.listeners.is_empty());
        let retry = last_play(&ctx, Channel::Background);
        assert_ne!(retry, req);

        audio.play_settled(Channel::Background, retry, PlayResult::Started, &mut ctx);
        assert_eq!(audio.audible(), vec![Channel::Background]);
    }

    #[test]
    fn at_most_one_retry_listener_per_channel() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.play_background(&mut ctx);
        let first = last_play(&ctx, Channel::Background);
        audio.play_background(&mut ctx);
        let second = last_play(&ctx, Channel::Background);

        // Only the newest request is still pending.
        audio.play_settled(Channel::Background, first, PlayResult::Rejected, &mut ctx);
        assert!(ctx.listeners.is_empty());
        audio.play_settled(Channel::Background, second, PlayResult::Rejected, &mut ctx);
        assert_eq!(ctx.listeners.len(), 1);

        // A refused retry re-arms the same single listener.
        fire(&mut ctx, &mut audio, GestureKind::Click);
        let retry = last_play(&ctx, Channel::Background);
        audio.play_settled(Channel::Background, retry, PlayResult::Rejected, &mut ctx);
        assert_eq!(ctx.listeners.len(), 1);
    }

    #[test]
    fn switch_leaves_exactly_main_audible() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.play_background(&mut ctx);
        let bg = last_play(&ctx, Channel::Background);
        audio.play_settled(Channel::Background, bg, PlayResult::Started, &mut ctx);
        assert_eq!(audio.audible(), vec![Channel::Background]);

        audio.switch_to_main(&mut ctx);
        let main = last_play(&ctx, Channel::Main);
        audio.play_settled(Channel::Main, main, PlayResult::Started, &mut ctx);

        let background = audio.channel(Channel::Background);
        assert!(!background.playing);
        assert_eq!(background.position, 0.0);
        let main = audio.channel(Channel::Main);
        assert!(main.playing);
        assert_eq!(main.position, 0.0);
        assert_eq!(audio.audible(), vec![Channel::Main]);
    }

    #[test]
    fn switch_cancels_background_retry() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.play_background(&mut ctx);
        let bg = last_play(&ctx, Channel::Background);
        audio.play_settled(Channel::Background, bg, PlayResult::Rejected, &mut ctx);

        audio.switch_to_main(&mut ctx);
        let main = last_play(&ctx, Channel::Main);
        audio.play_settled(Channel::Main, main, PlayResult::Started, &mut ctx);

        // A later click must not bring the background back.
        fire(&mut ctx, &mut audio, GestureKind::Click);
        assert_eq!(audio.audible(), vec![Channel::Main]);
    }

    #[test]
    fn pause_abandons_pending_background_request() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.play_background(&mut ctx);
        let bg = last_play(&ctx, Channel::Background);
        audio.switch_to_main(&mut ctx);

        // The browser aborts the pending play when paused; that is not a refusal to retry.
        audio.play_settled(Channel::Background, bg, PlayResult::Rejected, &mut ctx);
        assert!(audio.channel(Channel::Background).retry.is_none());
    }

    #[test]
    fn main_rejection_retries_on_click_only() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.switch_to_main(&mut ctx);
        let main = last_play(&ctx, Channel::Main);
        audio.play_settled(Channel::Main, main, PlayResult::Rejected, &mut ctx);

        assert!(ctx.listeners.matching(GestureTarget::Document, GestureKind::TouchStart).is_empty());
        assert_eq!(ctx.listeners.matching(GestureTarget::Document, GestureKind::Click).len(), 1);
    }

    #[test]
    fn unlock_is_silent_and_rewinds() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.unlock_main(&mut ctx);
        assert!(audio.channel(Channel::Main).muted);

        let req = last_play(&ctx, Channel::Main);
        audio.play_settled(Channel::Main, req, PlayResult::Started, &mut ctx);
        let cmds = ctx.drain_commands();
        assert!(cmds.ends_with(&[
            HostCommand::Audio { channel: Channel::Main, op: AudioOp::Pause },
            HostCommand::Audio { channel: Channel::Main, op: AudioOp::Rewind },
        ]));
        assert!(audio.audible().is_empty());
    }

    #[test]
    fn unlock_failure_is_swallowed() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.unlock_main(&mut ctx);
        let req = last_play(&ctx, Channel::Main);
        audio.play_settled(Channel::Main, req, PlayResult::Rejected, &mut ctx);
        assert!(ctx.listeners.is_empty());
        assert!(audio.channel(Channel::Main).pending.is_none());
    }

    #[test]
    fn replay_reset_rewinds_main_and_restarts_background() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.switch_to_main(&mut ctx);
        let main = last_play(&ctx, Channel::Main);
        audio.play_settled(Channel::Main, main, PlayResult::Started, &mut ctx);

        audio.reset_for_replay(&mut ctx);
        let bg = last_play(&ctx, Channel::Background);
        audio.play_settled(Channel::Background, bg, PlayResult::Started, &mut ctx);

        assert!(!audio.channel(Channel::Main).playing);
        assert_eq!(audio.channel(Channel::Main).position, 0.0);
        assert_eq!(audio.audible(), vec![Channel::Background]);
    }

    #[test]
    fn restore_replays_only_what_was_playing() {
        let mut ctx = HostContext::new();
        let mut audio = AudioController::new();
        audio.switch_to_main(&mut ctx);
        let main = last_play(&ctx, Channel::Main);
        audio.play_settled(Channel::Main, main, PlayResult::Started, &mut ctx);
        ctx.drain_commands();

        audio.resume_after_restore(&mut ctx);
        let cmds = ctx.drain_commands();
        assert_eq!(cmds.len(), 1);
        let HostCommand::Audio { channel: Channel::Main, op: AudioOp::Play { request } } = &cmds[0] else {
            panic!("expected a main play request, got {:?}", cmds);
        };
        assert!(audio.audible().is_empty());

        audio.play_settled(Channel::Main, *request, PlayResult::Rejected, &mut ctx);
        assert_eq!(ctx.listeners.matching(GestureTarget::Document, GestureKind::Click).len(), 1);
    }
}
