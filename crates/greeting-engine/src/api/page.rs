//! The page: owns every component and routes timers, gestures and host
//! reports between them.
//!
//! The host calls [`Page::init`] once with a snapshot of the document, then
//! [`Page::tick`] every frame. After each call it applies
//! [`Page::drain_commands`] and [`Page::drain_styles`]. Asynchronous outcomes
//! (play promises, image loads, gestures) come back through
//! [`Page::push_input`] and are handled on the next tick.

use std::collections::BTreeMap;

use crate::api::config::PageConfig;
use crate::api::context::{HostCommand, HostContext, ListenerAction, TimerAction};
use crate::api::types::{GestureKind, GestureTarget, ListenerId};
use crate::audio::AudioController;
use crate::core::scene::{Scene, StyleUpdate};
use crate::core::style::ElementStyle;
use crate::input::queue::{InputEvent, InputQueue};
use crate::systems::gallery::GalleryHandle;
use crate::systems::overlay::{OverlayState, UnlockOverlay};
use crate::systems::text::{segment, Segmentation};
use crate::timeline::{greeting_schedule, span_selector, Effect, Schedule, Timeline, SEGMENTED_SELECTORS};

/// What the host found in the document at load time.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    styles: BTreeMap<String, Vec<ElementStyle>>,
    texts: BTreeMap<String, String>,
}

impl PageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` elements match `selector`, all with default styles.
    pub fn with_count(self, selector: impl Into<String>, count: usize) -> Self {
        self.with_styles(selector, vec![ElementStyle::default(); count])
    }

    /// Elements matching `selector`, in document order, with their current styles.
    pub fn with_styles(mut self, selector: impl Into<String>, styles: Vec<ElementStyle>) -> Self {
        self.styles.insert(selector.into(), styles);
        self
    }

    /// Text content of the first element matching `selector`.
    pub fn with_text(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(selector.into(), text.into());
        self
    }
}

/// Spans start out with what they inherit from their block.
fn inherited(parent: Option<&ElementStyle>) -> ElementStyle {
    let mut style = ElementStyle::default();
    if let Some(parent) = parent {
        style.visibility = parent.visibility.clone();
        style.color = parent.color;
    }
    style
}

pub struct Page {
    config: PageConfig,
    ctx: HostContext,
    scene: Scene,
    timeline: Timeline,
    audio: AudioController,
    overlay: UnlockOverlay,
    gallery: Option<GalleryHandle>,
    input: InputQueue,
    replay_listener: Option<ListenerId>,
    /// Clock time the timeline has been advanced to.
    timeline_clock_ms: f64,
    started: bool,
    torn_down: bool,
}

impl Page {
    pub fn new(config: PageConfig) -> Self {
        let mut scene = Scene::new();
        let timeline = Timeline::compile(&Schedule::new(), &mut scene);
        let overlay = UnlockOverlay::new(
            config.countdown_from,
            config.countdown_tick_ms,
            config.idle_prompt.clone(),
        );
        Self {
            config,
            ctx: HostContext::new(),
            scene,
            timeline,
            audio: AudioController::new(),
            overlay,
            gallery: None,
            input: InputQueue::new(),
            replay_listener: None,
            timeline_clock_ms: 0.0,
            started: false,
            torn_down: false,
        }
    }

    /// Segment the text blocks, build the timeline, request background
    /// playback and either arm the overlay or schedule the timeline start.
    pub fn init(&mut self, layout: PageLayout) {
        let PageLayout { styles, texts } = layout;
        for (selector, group) in styles {
            self.scene.register_with(selector, group);
        }

        for selector in SEGMENTED_SELECTORS {
            let Some(text) = texts.get(selector) else {
                continue;
            };
            let segmented = segment(text, Segmentation::Chars);
            let span = inherited(self.scene.get(selector, 0));
            self.scene
                .register_with(span_selector(selector), vec![span; segmented.span_count()]);
            self.ctx.emit(HostCommand::SetInnerHtml {
                selector: selector.to_string(),
                html: segmented.html,
            });
        }

        let schedule = greeting_schedule(self.config.gallery.is_some());
        for selector in schedule.selectors() {
            if !self.scene.contains(selector) {
                log::debug!("no elements match {}", selector);
                self.scene.register(selector, 0);
            }
        }
        self.timeline = Timeline::compile(&schedule, &mut self.scene);
        log::info!(
            "timeline built: {} tweens, {:.2}s",
            self.timeline.tween_count(),
            self.timeline.duration()
        );

        self.audio.play_background(&mut self.ctx);
        if self.config.use_unlock_overlay {
            self.overlay.arm(&mut self.ctx);
        } else {
            // The overlay markup is still in the document; keep it out of the way.
            self.ctx.emit(HostCommand::OverlayVisible(false));
            self.ctx.set_timeout(self.config.start_delay_ms, TimerAction::StartTimeline);
        }
        self.replay_listener = Some(self.ctx.listen(
            GestureTarget::Replay,
            &[GestureKind::Click],
            ListenerAction::Replay,
        ));
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Handle queued input, then move the clock forward `dt` seconds, firing
    /// due timers and advancing the timeline in step with them.
    pub fn tick(&mut self, dt: f32) {
        if self.torn_down {
            self.input.drain();
            return;
        }
        for event in self.input.drain() {
            self.handle_input(event);
        }

        let target_ms = self.ctx.timers.now_ms() + f64::from(dt.max(0.0)) * 1000.0;
        while let Some((_, action)) = self.ctx.timers.pop_due(target_ms) {
            let now = self.ctx.timers.now_ms();
            self.advance_timeline_to(now);
            self.handle_timer(action);
        }
        self.ctx.timers.advance_to(target_ms);
        self.advance_timeline_to(target_ms);
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Gesture { target, kind } => {
                for id in self.ctx.listeners.matching(target, kind) {
                    // An earlier handler may already have disposed this listener.
                    if let Some(action) = self.ctx.listeners.take(id) {
                        self.handle_listener(action);
                    }
                }
            }
            InputEvent::PlaySettled { channel, request, result } => {
                self.audio.play_settled(channel, request, result, &mut self.ctx);
            }
            InputEvent::ImageSettled { generation, loaded } => {
                if let Some(gallery) = &mut self.gallery {
                    gallery.on_image_settled(generation, loaded, &mut self.ctx);
                }
            }
        }
    }

    fn handle_listener(&mut self, action: ListenerAction) {
        match action {
            ListenerAction::RetryPlay(channel) => self.audio.retry(channel, &mut self.ctx),
            ListenerAction::OverlayGesture => {
                if self.overlay.on_gesture(&mut self.audio, &mut self.ctx) {
                    self.start_timeline();
                }
            }
            ListenerAction::Replay => self.replay(),
        }
    }

    fn handle_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::StartTimeline => self.start_timeline(),
            TimerAction::CountdownTick => {
                if self.overlay.on_tick(&mut self.ctx) {
                    self.start_timeline();
                }
            }
            TimerAction::GalleryAdvance => {
                if let Some(gallery) = &mut self.gallery {
                    gallery.advance(&mut self.ctx);
                }
            }
            TimerAction::GallerySwap { generation } => {
                if let Some(gallery) = &mut self.gallery {
                    gallery.on_swap(generation, &mut self.ctx);
                }
            }
            TimerAction::GalleryReveal { generation } => {
                if let Some(gallery) = &mut self.gallery {
                    gallery.on_reveal(generation, &mut self.ctx);
                }
            }
        }
    }

    fn start_timeline(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.timeline_clock_ms = self.ctx.timers.now_ms();
        self.timeline.play();
        log::info!("timeline started");
    }

    fn advance_timeline_to(&mut self, now_ms: f64) {
        let dt = ((now_ms - self.timeline_clock_ms) / 1000.0) as f32;
        self.timeline_clock_ms = now_ms;
        if !self.timeline.is_playing() || dt <= 0.0 {
            return;
        }
        for effect in self.timeline.advance(dt, &mut self.scene) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SwitchToMain => self.audio.switch_to_main(&mut self.ctx),
            Effect::StartGallery => {
                let Some(config) = &self.config.gallery else {
                    return;
                };
                if let Some(mut old) = self.gallery.take() {
                    old.stop(&mut self.ctx);
                }
                self.gallery = GalleryHandle::start(
                    config.element_id.clone(),
                    config.candidates.clone(),
                    config.interval_ms,
                    &mut self.ctx,
                );
            }
        }
    }

    /// Restart the timeline from zero and reset audio: main rewound,
    /// background playing again. Ignored until the timeline has started.
    pub fn replay(&mut self) {
        if self.torn_down || !self.started {
            log::debug!("replay ignored: timeline not started");
            return;
        }
        if let Some(mut gallery) = self.gallery.take() {
            gallery.stop(&mut self.ctx);
        }
        self.timeline.restart(&mut self.scene);
        self.timeline_clock_ms = self.ctx.timers.now_ms();
        self.audio.reset_for_replay(&mut self.ctx);
        log::info!("replaying");
    }

    /// The document was restored from the back/forward cache. The clock
    /// simply continues; audio that was playing is requested again.
    pub fn resume(&mut self) {
        if self.torn_down {
            return;
        }
        self.audio.resume_after_restore(&mut self.ctx);
        log::info!("page restored");
    }

    /// Dispose every timer, listener and the gallery. The page is inert afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.overlay.dispose(&mut self.ctx);
        if let Some(mut gallery) = self.gallery.take() {
            gallery.stop(&mut self.ctx);
        }
        self.audio.dispose(&mut self.ctx);
        if let Some(id) = self.replay_listener.take() {
            self.ctx.unlisten(id);
        }
        self.ctx.dispose_all();
        self.timeline.pause();
        self.torn_down = true;
        log::info!("page torn down");
    }

    /// Take the commands emitted since the last drain.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        self.ctx.drain_commands()
    }

    /// Take every element style changed since the last drain.
    pub fn drain_styles(&mut self) -> Vec<StyleUpdate> {
        self.scene.drain_dirty()
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn audio(&self) -> &AudioController {
        &self.audio
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    pub fn gallery(&self) -> Option<&GalleryHandle> {
        self.gallery.as_ref()
    }

    /// Host context, for inspecting pending timers and listeners.
    pub fn host(&self) -> &HostContext {
        &self.ctx
    }

    /// Virtual clock time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.ctx.timers.now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::GalleryConfig;
    use crate::api::context::AudioOp;
    use crate::api::types::{Channel, PlayResult};
    use crate::core::style::ComputedStyle;

    /// Every selector the greeting targets, one element each, plus segmented text.
    fn layout() -> PageLayout {
        let mut layout = PageLayout::new();
        for selector in greeting_schedule(true).selectors() {
            layout = layout.with_count(selector, 1);
        }
        layout
            .with_count(".baloons img", 4)
            .with_text(".hbd-chatbox", "Happy birthday!")
            .with_text(".wish-hbd", "Wish you")
    }

    /// Records what the host was asked to do and answers play requests.
    struct FakeHost {
        commands: Vec<HostCommand>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self { commands: Vec::new() }
        }

        /// Collect commands and answer every queued play request with `result`.
        fn pump(&mut self, page: &mut Page, result: PlayResult) {
            let cmds = page.drain_commands();
            for cmd in &cmds {
                if let HostCommand::Audio { channel, op: AudioOp::Play { request } } = cmd {
                    page.push_input(InputEvent::PlaySettled { channel: *channel, request: *request, result });
                }
                if let HostCommand::Preload { generation, .. } = cmd {
                    page.push_input(InputEvent::ImageSettled { generation: *generation, loaded: true });
                }
            }
            self.commands.extend(cmds);
        }

        /// Tick in 50 ms frames for `seconds`, answering play requests.
        fn run(&mut self, page: &mut Page, seconds: f32, result: PlayResult) {
            let frames = (seconds / 0.05).round() as usize;
            for _ in 0..frames {
                page.tick(0.05);
                self.pump(page, result);
            }
        }

        fn played(&self, channel: Channel) -> usize {
            self.commands
                .iter()
                .filter(|c| matches!(c, HostCommand::Audio { channel: ch, op: AudioOp::Play { .. } } if *ch == channel))
                .count()
        }
    }

    fn click(page: &mut Page, target: GestureTarget) {
        page.push_input(InputEvent::Gesture { target, kind: GestureKind::Click });
        page.tick(0.0);
    }

    #[test]
    fn segments_text_before_building_timeline() {
        let mut page = Page::new(PageConfig::default());
        page.init(layout());
        assert_eq!(page.scene().count(".hbd-chatbox span"), 15);
        assert_eq!(page.scene().count(".wish-hbd span"), 8);

        let cmds = page.drain_commands();
        assert!(cmds.iter().any(|c| matches!(
            c,
            HostCommand::SetInnerHtml { selector, html } if selector == ".wish-hbd" && html.starts_with("<span>W</span>")
        )));
    }

    #[test]
    fn missing_elements_are_harmless() {
        let mut page = Page::new(PageConfig { use_unlock_overlay: false, ..PageConfig::default() });
        page.init(PageLayout::new());
        assert_eq!(page.scene().count(".one"), 0);

        let mut host = FakeHost::new();
        host.pump(&mut page, PlayResult::Started);
        host.run(&mut page, 120.0, PlayResult::Started);
        assert!(page.timeline().is_complete());
        assert_eq!(page.audio().audible(), vec![Channel::Main]);
    }

    #[test]
    fn overlay_gates_timeline_then_music_switches() {
        let mut page = Page::new(PageConfig::default());
        page.init(layout());
        let mut host = FakeHost::new();
        host.pump(&mut page, PlayResult::Started);
        page.tick(0.0);
        assert_eq!(page.audio().audible(), vec![Channel::Background]);

        // Nothing moves until the overlay is touched.
        host.run(&mut page, 5.0, PlayResult::Started);
        assert_eq!(page.overlay_state(), OverlayState::AwaitingGesture);
        assert!(!page.timeline().is_playing());

        click(&mut page, GestureTarget::Overlay);
        assert_eq!(page.overlay_state(), OverlayState::CountingDown(3));
        host.run(&mut page, 2.0, PlayResult::Started);
        assert_eq!(page.overlay_state(), OverlayState::CountingDown(1));
        host.run(&mut page, 0.2, PlayResult::Started);
        assert_eq!(page.overlay_state(), OverlayState::Released);
        assert!(page.timeline().is_playing());
        assert!(host.commands.contains(&HostCommand::OverlayVisible(false)));

        let switch = page.timeline().effect_time(Effect::SwitchToMain).unwrap();
        host.run(&mut page, switch + 0.5, PlayResult::Started);
        assert_eq!(page.audio().audible(), vec![Channel::Main]);
        assert_eq!(page.audio().channel(Channel::Background).position, 0.0);
    }

    #[test]
    fn timeline_starts_after_delay_without_overlay() {
        let mut page = Page::new(PageConfig { use_unlock_overlay: false, ..PageConfig::default() });
        page.init(layout());
        let cmds = page.drain_commands();
        assert!(!cmds.contains(&HostCommand::OverlayVisible(true)));
        assert!(cmds.contains(&HostCommand::OverlayVisible(false)));
        assert_eq!(page.overlay_state(), OverlayState::Idle);

        page.tick(0.15);
        assert!(!page.timeline().is_playing());
        page.tick(0.1);
        assert!(page.timeline().is_playing());
        // Started at 200 ms, so it has run for 50 ms.
        assert!((page.timeline().playhead() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn sections_follow_the_container_reveal() {
        // Inside the hidden container every section computes as hidden, and
        // an unset background computes as transparent.
        let hidden = ElementStyle::from(ComputedStyle {
            opacity: "1".into(),
            visibility: "hidden".into(),
            color: "rgb(0, 0, 0)".into(),
            background_color: "rgba(0, 0, 0, 0)".into(),
        });
        let mut layout = PageLayout::new();
        for selector in greeting_schedule(false).selectors() {
            layout = layout.with_styles(selector, vec![hidden.clone()]);
        }
        let layout = layout
            .with_styles(".hbd-chatbox", vec![hidden.clone()])
            .with_text(".hbd-chatbox", "Hi");

        let mut page = Page::new(PageConfig { use_unlock_overlay: false, ..PageConfig::default() });
        page.init(layout);
        let mut host = FakeHost::new();
        let mut written: Vec<StyleUpdate> = Vec::new();
        let frames = ((page.timeline().duration() + 1.0) / 0.05) as usize;
        for _ in 0..frames {
            page.tick(0.05);
            host.pump(&mut page, PlayResult::Started);
            written.extend(page.drain_styles());
        }
        assert!(page.timeline().is_complete());

        let declared = |selector: &str, name: &str| -> Vec<String> {
            written
                .iter()
                .filter(|u| u.selector == selector)
                .flat_map(|u| u.style.css_declarations())
                .filter(|(n, _)| *n == name)
                .map(|(_, v)| v)
                .collect()
        };
        assert_eq!(declared(".container", "visibility").last().map(String::as_str), Some("visible"));
        assert!(!declared(".one", "opacity").is_empty());
        assert!(declared(".one", "visibility").is_empty());
        assert!(declared(".one", "background-color").is_empty());
        assert!(declared(".one", "color").is_empty());
        assert_eq!(declared(".hbd-chatbox span", "visibility").last().map(String::as_str), Some("visible"));

        let fill = declared(".idea-3 strong", "background-color");
        assert!(fill.iter().any(|v| v.starts_with("rgba(")));
        assert_eq!(fill.last().map(String::as_str), Some("rgb(21, 161, 237)"));
    }

    #[test]
    fn blocked_background_starts_on_first_gesture() {
        let mut page = Page::new(PageConfig { use_unlock_overlay: false, ..PageConfig::default() });
        page.init(layout());
        let mut host = FakeHost::new();
        host.pump(&mut page, PlayResult::Rejected);
        page.tick(0.0);
        assert!(page.audio().audible().is_empty());

        page.push_input(InputEvent::Gesture { target: GestureTarget::Document, kind: GestureKind::TouchStart });
        page.tick(0.0);
        host.pump(&mut page, PlayResult::Started);
        page.tick(0.0);
        assert_eq!(page.audio().audible(), vec![Channel::Background]);
        assert_eq!(host.played(Channel::Background), 2);
    }

    #[test]
    fn gallery_starts_at_switch_point() {
        let config = PageConfig {
            use_unlock_overlay: false,
            gallery: Some(GalleryConfig {
                element_id: "photo".into(),
                candidates: vec!["a.jpg".into(), "b.jpg".into()],
                interval_ms: 2000.0,
            }),
            ..PageConfig::default()
        };
        let mut page = Page::new(config);
        page.init(layout());
        let mut host = FakeHost::new();
        host.pump(&mut page, PlayResult::Started);

        let switch = page.timeline().effect_time(Effect::StartGallery).unwrap();
        host.run(&mut page, switch, PlayResult::Started);
        assert!(page.gallery().is_none());
        host.run(&mut page, 0.5, PlayResult::Started);
        assert_eq!(page.gallery().map(|g| g.source()), Some("a.jpg"));
        host.run(&mut page, 2.0, PlayResult::Started);
        assert_eq!(page.gallery().map(|g| g.source()), Some("b.jpg"));
        assert!(host.commands.iter().any(|c| matches!(
            c,
            HostCommand::ImageClass { present: true, .. }
        )));
    }

    #[test]
    fn replay_restarts_everything() {
        let config = PageConfig {
            use_unlock_overlay: false,
            gallery: Some(GalleryConfig {
                element_id: "photo".into(),
                candidates: vec!["a.jpg".into()],
                interval_ms: 2000.0,
            }),
            ..PageConfig::default()
        };
        let mut page = Page::new(config);
        page.init(layout());
        let mut host = FakeHost::new();
        host.pump(&mut page, PlayResult::Started);
        let duration = page.timeline().duration();
        host.run(&mut page, duration + 1.0, PlayResult::Started);
        assert!(page.timeline().is_complete());
        assert!(page.gallery().is_some());
        let faded = page.scene().get(".one", 0).unwrap().opacity;

        click(&mut page, GestureTarget::Replay);
        assert!(page.gallery().is_none());
        assert!(page.timeline().is_playing());
        assert_eq!(page.timeline().playhead(), 0.0);
        // `.one` is back at its pre-roll state (faded in from nothing).
        assert_eq!(faded, 0.0);
        assert_eq!(page.scene().get(".one", 0).unwrap().opacity, 0.0);
        assert!(!page.audio().channel(Channel::Main).playing);

        host.pump(&mut page, PlayResult::Started);
        page.tick(0.0);
        assert_eq!(page.audio().audible(), vec![Channel::Background]);

        // The switch fires again on the second playthrough.
        let switch = page.timeline().effect_time(Effect::SwitchToMain).unwrap();
        host.run(&mut page, switch + 0.5, PlayResult::Started);
        assert_eq!(page.audio().audible(), vec![Channel::Main]);
        assert!(page.gallery().is_some());
    }

    #[test]
    fn replay_before_start_is_ignored() {
        let mut page = Page::new(PageConfig::default());
        page.init(layout());
        click(&mut page, GestureTarget::Replay);
        assert!(!page.timeline().is_playing());
        assert_eq!(page.overlay_state(), OverlayState::AwaitingGesture);
    }

    #[test]
    fn restored_page_picks_up_where_it_left_off() {
        let mut page = Page::new(PageConfig { use_unlock_overlay: false, ..PageConfig::default() });
        page.init(layout());
        let mut host = FakeHost::new();
        host.pump(&mut page, PlayResult::Started);
        host.run(&mut page, 1.0, PlayResult::Started);
        let playhead = page.timeline().playhead();
        let plays = host.played(Channel::Background);

        page.resume();
        host.pump(&mut page, PlayResult::Started);
        page.tick(0.0);
        assert_eq!(host.played(Channel::Background), plays + 1);
        assert_eq!(page.audio().audible(), vec![Channel::Background]);
        assert!(page.timeline().is_playing());
        assert_eq!(page.timeline().playhead(), playhead);
    }

    #[test]
    fn teardown_disposes_all_handles() {
        let config = PageConfig {
            gallery: Some(GalleryConfig {
                element_id: "photo".into(),
                candidates: vec!["a.jpg".into(), "b.jpg".into()],
                interval_ms: 2000.0,
            }),
            ..PageConfig::default()
        };
        let mut page = Page::new(config);
        page.init(layout());
        let mut host = FakeHost::new();
        host.pump(&mut page, PlayResult::Rejected);
        page.tick(0.0);
        assert!(!page.host().listeners.is_empty());

        page.teardown();
        assert!(page.host().listeners.is_empty());
        assert!(page.host().timers.is_empty());

        click(&mut page, GestureTarget::Overlay);
        page.tick(10.0);
        assert_eq!(page.overlay_state(), OverlayState::AwaitingGesture);
        assert!(page.drain_commands().is_empty());
    }
}
