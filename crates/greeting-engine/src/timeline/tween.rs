// timeline/tween.rs
//
// A single placed tween: one element, one property set, a start time on the
// timeline, and the from/to values it interpolates between.
//
// Usage (through the timeline, which places tweens):
//   let mut tween = Tween::place(target, TweenMode::To, None, Some(&props), 0.7, 0.0, &mut scene);
//   tween.render(playhead, &mut scene);

use crate::core::scene::Scene;
use crate::extensions::easing::Easing;
use super::props::{Property, Props, Value};

/// Easing used when a step does not set one.
pub const DEFAULT_EASE: Easing = Easing::QuadOut;

/// How a tween's endpoints are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenMode {
    /// Animate from the element's values at first render to the given values.
    To,
    /// Animate from the given values to the element's values at placement.
    From,
    /// Both endpoints given.
    FromTo,
}

/// The element a tween drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweenTarget {
    pub selector: String,
    pub index: usize,
}

/// A tween placed on the timeline.
#[derive(Debug, Clone)]
pub struct Tween {
    pub target: TweenTarget,
    pub mode: TweenMode,
    /// Start time on the timeline, in seconds.
    pub start: f32,
    /// Duration of one play, in seconds.
    pub duration: f32,
    pub easing: Easing,
    pub repeat: u32,
    pub repeat_delay: f32,
    properties: Vec<Property>,
    /// Start values; `None` for a `To` tween that has not rendered yet.
    from: Option<Vec<Value>>,
    to: Vec<Value>,
}

impl Tween {
    /// Place a tween. `From` and `FromTo` tweens render their start state
    /// immediately; `From` takes its end state from the scene before doing so.
    pub fn place(
        target: TweenTarget,
        mode: TweenMode,
        from: Option<&Props>,
        to: Option<&Props>,
        duration: f32,
        start: f32,
        scene: &mut Scene,
    ) -> Self {
        let options = tween_options(mode, from, to);

        let properties: Vec<Property> = match mode {
            TweenMode::To => to.map(|p| p.properties().collect()).unwrap_or_default(),
            TweenMode::From => from.map(|p| p.properties().collect()).unwrap_or_default(),
            TweenMode::FromTo => {
                let mut props: Vec<Property> = to.map(|p| p.properties().collect()).unwrap_or_default();
                for p in from.into_iter().flat_map(|f| f.properties()) {
                    if !props.contains(&p) {
                        props.push(p);
                    }
                }
                props
            }
        };

        let view: &Scene = scene;
        let current = view.get(&target.selector, target.index);
        let pick = |bag: Option<&Props>, p: Property| {
            bag.and_then(|b| b.get(p).cloned())
                .or_else(|| current.map(|s| p.read(s)))
                .unwrap_or(Value::Number(0.0))
        };
        let values = |bag: Option<&Props>| -> Vec<Value> {
            properties.iter().map(|&p| pick(bag, p)).collect()
        };

        let (from_values, to_values): (Option<Vec<Value>>, Vec<Value>) = match mode {
            TweenMode::To => (None, values(to)),
            TweenMode::From => (Some(values(from)), values(None)),
            TweenMode::FromTo => (Some(values(from)), values(to)),
        };

        let mut tween = Self {
            target,
            mode,
            start,
            duration: duration.max(0.0),
            easing: options.ease.unwrap_or(DEFAULT_EASE),
            repeat: options.repeat,
            repeat_delay: options.repeat_delay,
            properties,
            from: from_values,
            to: to_values,
        };

        if tween.mode != TweenMode::To {
            tween.render_progress(0.0, scene);
        }
        tween
    }

    /// Length of one play plus every repeat and repeat delay.
    pub fn total_duration(&self) -> f32 {
        single_duration(self.duration, self.repeat, self.repeat_delay)
    }

    /// Timeline time at which the tween has fully finished.
    pub fn end(&self) -> f32 {
        self.start + self.total_duration()
    }

    /// Progress of the current play at timeline time `time`, in [0, 1].
    pub fn progress_at(&self, time: f32) -> f32 {
        let elapsed = time - self.start;
        if elapsed <= 0.0 {
            return if self.duration <= 0.0 && elapsed == 0.0 { 1.0 } else { 0.0 };
        }
        if elapsed >= self.total_duration() || self.duration <= 0.0 {
            return 1.0;
        }
        let cycle = self.duration + self.repeat_delay;
        let within = elapsed % cycle;
        if within >= self.duration {
            // Holding the end state during a repeat delay.
            1.0
        } else {
            within / self.duration
        }
    }

    /// Render the tween's state at timeline time `time`.
    pub fn render(&mut self, time: f32, scene: &mut Scene) {
        let progress = self.progress_at(time);
        self.render_progress(progress, scene);
    }

    /// Render at an explicit progress. Captures `To` start values on first use.
    pub fn render_progress(&mut self, progress: f32, scene: &mut Scene) {
        let Some(style) = scene.get_mut(&self.target.selector, self.target.index) else {
            return;
        };

        let from = self
            .from
            .get_or_insert_with(|| self.properties.iter().map(|p| p.read(style)).collect());

        let eased = self.easing.apply(progress);
        for ((property, from), to) in self.properties.iter().zip(from.iter()).zip(self.to.iter()) {
            property.write(style, &from.blend(to, eased, progress));
        }
    }

    /// Whether start values are known (always for `From`/`FromTo`, after first render for `To`).
    pub fn has_start_values(&self) -> bool {
        self.from.is_some()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// The bag whose ease/repeat settings apply: the `from` vars for `From`, else the `to` vars.
pub fn tween_options(mode: TweenMode, from: Option<&Props>, to: Option<&Props>) -> Props {
    match mode {
        TweenMode::From => from,
        TweenMode::To | TweenMode::FromTo => to.or(from),
    }
    .cloned()
    .unwrap_or_default()
}

/// Length of one target's animation including repeats.
pub fn single_duration(duration: f32, repeat: u32, repeat_delay: f32) -> f32 {
    duration * (repeat + 1) as f32 + repeat_delay * repeat as f32
}

/// Total length of a stagger over `targets` elements started `each` apart.
/// An empty target set still occupies one target's duration.
pub fn stagger_duration(targets: usize, each: f32, single: f32) -> f32 {
    if targets == 0 {
        single
    } else {
        (targets - 1) as f32 * each + single
    }
}
