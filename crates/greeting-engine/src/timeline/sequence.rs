//! Compiled timeline: resolved start times, placed tweens, effect markers,
//! and a playhead that renders into the [`Scene`].

use std::collections::HashMap;

use crate::core::scene::Scene;
use super::schedule::{Effect, Position, Schedule, StepKind};
use super::tween::{single_duration, stagger_duration, tween_options, Tween, TweenTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Active,
    Done,
}

#[derive(Debug, Clone)]
enum Entry {
    Tween { tween: Tween, phase: Phase },
    Effect { at: f32, effect: Effect, fired: bool },
}

impl Entry {
    fn start(&self) -> f32 {
        match self {
            Entry::Tween { tween, .. } => tween.start,
            Entry::Effect { at, .. } => *at,
        }
    }
}

/// A compiled, playable timeline.
#[derive(Debug, Clone)]
pub struct Timeline {
    entries: Vec<Entry>,
    /// Entry indices sorted by start time (stable, so insertion order breaks ties).
    order: Vec<usize>,
    labels: HashMap<String, f32>,
    /// Resolved start time of each schedule step.
    step_starts: Vec<f32>,
    duration: f32,
    playhead: f32,
    playing: bool,
}

impl Timeline {
    /// Resolve every step's position and place its tweens against the scene.
    /// `From`/`FromTo` tweens render their start state during this call, so
    /// the scene must already hold every element the schedule targets
    /// (including segmented spans).
    pub fn compile(schedule: &Schedule, scene: &mut Scene) -> Self {
        let mut timeline = Self {
            entries: Vec::new(),
            order: Vec::new(),
            labels: HashMap::new(),
            step_starts: Vec::with_capacity(schedule.len()),
            duration: 0.0,
            playhead: 0.0,
            playing: false,
        };

        for step in schedule.steps() {
            let start = timeline.resolve(&step.position);
            timeline.step_starts.push(start);

            let span = match &step.kind {
                StepKind::Tween { mode, from, to } => {
                    let count = scene.count(&step.selector);
                    for index in 0..count {
                        let target = TweenTarget { selector: step.selector.clone(), index };
                        let tween = Tween::place(target, *mode, from.as_ref(), to.as_ref(), step.duration, start, scene);
                        timeline.entries.push(Entry::Tween { tween, phase: Phase::Pending });
                    }
                    let options = tween_options(*mode, from.as_ref(), to.as_ref());
                    single_duration(step.duration, options.repeat, options.repeat_delay)
                }
                StepKind::Stagger { mode, from, to, each } => {
                    let count = scene.count(&step.selector);
                    for index in 0..count {
                        let target = TweenTarget { selector: step.selector.clone(), index };
                        let at = start + index as f32 * each;
                        let tween = Tween::place(target, *mode, from.as_ref(), to.as_ref(), step.duration, at, scene);
                        timeline.entries.push(Entry::Tween { tween, phase: Phase::Pending });
                    }
                    let options = tween_options(*mode, from.as_ref(), to.as_ref());
                    let single = single_duration(step.duration, options.repeat, options.repeat_delay);
                    stagger_duration(count, *each, single)
                }
                StepKind::Effect(effect) => {
                    timeline.entries.push(Entry::Effect { at: start, effect: *effect, fired: false });
                    0.0
                }
            };

            timeline.duration = timeline.duration.max(start + span);
        }

        let mut order: Vec<usize> = (0..timeline.entries.len()).collect();
        order.sort_by(|&a, &b| timeline.entries[a].start().total_cmp(&timeline.entries[b].start()));
        timeline.order = order;

        log::debug!(
            "timeline compiled: {} steps, {} entries, {:.2}s",
            schedule.len(),
            timeline.entries.len(),
            timeline.duration
        );
        timeline
    }

    fn resolve(&mut self, position: &Position) -> f32 {
        match position {
            Position::Sequential => self.duration,
            Position::After(delay) => self.duration + delay,
            Position::Before(overlap) => (self.duration - overlap).max(0.0),
            Position::At(time) => time.max(0.0),
            Position::Label(name) => *self.labels.entry(name.clone()).or_insert(self.duration),
        }
    }

    /// Total length in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the playhead has reached the end.
    pub fn is_complete(&self) -> bool {
        self.playhead >= self.duration
    }

    /// Time a label resolved to.
    pub fn label(&self, name: &str) -> Option<f32> {
        self.labels.get(name).copied()
    }

    /// Resolved start time of the `index`-th schedule step.
    pub fn step_start(&self, index: usize) -> Option<f32> {
        self.step_starts.get(index).copied()
    }

    /// Time at which an effect is scheduled (first occurrence).
    pub fn effect_time(&self, effect: Effect) -> Option<f32> {
        self.entries.iter().find_map(|e| match e {
            Entry::Effect { at, effect: e, .. } if *e == effect => Some(*at),
            _ => None,
        })
    }

    /// Number of placed tweens (one per target element).
    pub fn tween_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Tween { .. }))
            .count()
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Move the playhead forward by `dt` seconds, rendering every tween that
    /// is active or finished inside the window, in start order. Returns the
    /// effects the playhead crossed, in time order.
    pub fn advance(&mut self, dt: f32, scene: &mut Scene) -> Vec<Effect> {
        if !self.playing {
            return Vec::new();
        }

        let now = (self.playhead + dt.max(0.0)).min(self.duration);
        self.playhead = now;

        let mut fired = Vec::new();
        for &i in &self.order {
            match &mut self.entries[i] {
                Entry::Tween { tween, phase } => {
                    if *phase == Phase::Done {
                        continue;
                    }
                    let reached = now > tween.start || (now >= tween.start && tween.total_duration() <= 0.0);
                    if !reached {
                        continue;
                    }
                    tween.render(now, scene);
                    *phase = if now >= tween.end() { Phase::Done } else { Phase::Active };
                }
                Entry::Effect { at, effect, fired: done } => {
                    if !*done && now >= *at {
                        *done = true;
                        fired.push(*effect);
                    }
                }
            }
        }

        if self.is_complete() {
            self.playing = false;
        }
        fired
    }

    /// Rewind to zero and play. Tweens that have rendered are put back to
    /// their start state, latest first, so the earliest tween on a property
    /// decides its value. Effects become armed again.
    pub fn restart(&mut self, scene: &mut Scene) {
        for &i in self.order.iter().rev() {
            match &mut self.entries[i] {
                Entry::Tween { tween, phase } => {
                    if tween.has_start_values() {
                        tween.render_progress(0.0, scene);
                    }
                    *phase = Phase::Pending;
                }
                Entry::Effect { fired, .. } => *fired = false,
            }
        }
        self.playhead = 0.0;
        self.playing = true;
    }
}
