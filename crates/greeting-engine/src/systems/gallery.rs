//! Rotating image gallery.
//!
//! Each display fades the image out by dropping the `visible` class, swaps
//! the source once the fade has had time to run, preloads the new image and
//! fades back in shortly after the image settles. Every display bumps a
//! generation counter so that timers and preload reports from an older
//! display are ignored.

use crate::api::context::{HostCommand, HostContext, TimerAction};
use crate::api::types::TimerId;

/// Delay between hiding the image and swapping its source.
pub const SWAP_DELAY_MS: f64 = 300.0;
/// Delay between the new image settling and showing it again.
pub const SETTLE_DELAY_MS: f64 = 40.0;
/// Shortest rotation interval. A faster interval would cancel every swap
/// before it fires.
pub const MIN_INTERVAL_MS: f64 = SWAP_DELAY_MS + SETTLE_DELAY_MS;
/// Class toggled on the image element to cross-fade it.
pub const VISIBLE_CLASS: &str = "visible";

/// A running gallery. Dropping it does not stop it; call [`GalleryHandle::stop`].
#[derive(Debug)]
pub struct GalleryHandle {
    element_id: String,
    candidates: Vec<String>,
    index: usize,
    generation: u32,
    interval: Option<TimerId>,
    swap: Option<TimerId>,
    reveal: Option<TimerId>,
}

impl GalleryHandle {
    /// Display the first candidate now and advance every `interval_ms`,
    /// raised to [`MIN_INTERVAL_MS`] if shorter. Returns `None` for an empty
    /// candidate list.
    pub fn start(
        element_id: impl Into<String>,
        candidates: Vec<String>,
        interval_ms: f64,
        ctx: &mut HostContext,
    ) -> Option<Self> {
        if candidates.is_empty() {
            log::debug!("gallery has no candidates; not starting");
            return None;
        }
        let mut gallery = Self {
            element_id: element_id.into(),
            candidates,
            index: 0,
            generation: 0,
            interval: None,
            swap: None,
            reveal: None,
        };
        gallery.display(ctx);
        if gallery.candidates.len() > 1 {
            if interval_ms < MIN_INTERVAL_MS {
                log::warn!("gallery interval {}ms too short; using {}ms", interval_ms, MIN_INTERVAL_MS);
            }
            let interval_ms = interval_ms.max(MIN_INTERVAL_MS);
            gallery.interval = Some(ctx.set_interval(interval_ms, TimerAction::GalleryAdvance));
        }
        log::info!("gallery started with {} images", gallery.candidates.len());
        Some(gallery)
    }

    /// Index of the candidate currently being displayed.
    pub fn current(&self) -> usize {
        self.index
    }

    /// URI of the candidate currently being displayed.
    pub fn source(&self) -> &str {
        &self.candidates[self.index]
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Move to the next candidate, wrapping.
    pub fn advance(&mut self, ctx: &mut HostContext) {
        self.index = (self.index + 1) % self.candidates.len();
        self.display(ctx);
    }

    fn display(&mut self, ctx: &mut HostContext) {
        self.cancel_pending(ctx);
        self.generation = self.generation.wrapping_add(1);
        self.set_visible(false, ctx);
        self.swap = Some(ctx.set_timeout(
            SWAP_DELAY_MS,
            TimerAction::GallerySwap { generation: self.generation },
        ));
    }

    /// The fade-out delay elapsed: swap the source and preload it.
    pub fn on_swap(&mut self, generation: u32, ctx: &mut HostContext) {
        if generation != self.generation {
            return;
        }
        self.swap = None;
        let uri = self.candidates[self.index].clone();
        ctx.emit(HostCommand::ImageSource {
            element_id: self.element_id.clone(),
            uri: uri.clone(),
        });
        ctx.emit(HostCommand::Preload { uri, generation });
    }

    /// The preload finished. A failed load is still revealed.
    pub fn on_image_settled(&mut self, generation: u32, loaded: bool, ctx: &mut HostContext) {
        if generation != self.generation || self.swap.is_some() || self.reveal.is_some() {
            return;
        }
        if !loaded {
            log::warn!("gallery image failed to load: {}", self.source());
        }
        self.reveal = Some(ctx.set_timeout(
            SETTLE_DELAY_MS,
            TimerAction::GalleryReveal { generation },
        ));
    }

    pub fn on_reveal(&mut self, generation: u32, ctx: &mut HostContext) {
        if generation != self.generation {
            return;
        }
        self.reveal = None;
        self.set_visible(true, ctx);
    }

    fn set_visible(&self, present: bool, ctx: &mut HostContext) {
        ctx.emit(HostCommand::ImageClass {
            element_id: self.element_id.clone(),
            class: VISIBLE_CLASS.to_string(),
            present,
        });
    }

    fn cancel_pending(&mut self, ctx: &mut HostContext) {
        for id in [self.swap.take(), self.reveal.take()].into_iter().flatten() {
            ctx.clear_timer(id);
        }
    }

    /// Cancel the interval and any pending swap or reveal.
    pub fn stop(&mut self, ctx: &mut HostContext) {
        self.cancel_pending(ctx);
        if let Some(id) = self.interval.take() {
            ctx.clear_timer(id);
        }
        // Outstanding preload reports now match no generation.
        self.generation = self.generation.wrapping_add(1);
    }
}
