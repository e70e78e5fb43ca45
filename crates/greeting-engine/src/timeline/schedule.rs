//! Declarative step list for a timeline.
//!
//! A [`Schedule`] is plain data: each [`Step`] names a selector, a duration,
//! what to animate (or which effect to fire) and where it sits relative to
//! the steps before it. [`Timeline::compile`](super::sequence::Timeline::compile)
//! resolves positions and places the tweens.

use std::collections::BTreeSet;

use super::props::Props;
use super::tween::TweenMode;

/// Where a step starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    /// Right after the current end of the timeline.
    Sequential,
    /// `+=d`: `d` seconds after the current end.
    After(f32),
    /// `-=d`: `d` seconds before the current end (overlap), never below 0.
    Before(f32),
    /// At a named label; created at the current end on first use.
    Label(String),
    /// Absolute time in seconds.
    At(f32),
}

impl Position {
    /// Parse the compact string form: `""`, `"+=2.5"`, `"-=1"`, `"3"`, or a label name.
    pub fn parse(s: &str) -> Position {
        let s = s.trim();
        if s.is_empty() {
            return Position::Sequential;
        }
        let offset = |rest: &str| rest.trim().parse::<f32>().ok().filter(|d| d.is_finite());
        if let Some(rest) = s.strip_prefix("+=") {
            return offset(rest).map_or_else(|| Self::invalid(s), Position::After);
        }
        if let Some(rest) = s.strip_prefix("-=") {
            return offset(rest).map_or_else(|| Self::invalid(s), Position::Before);
        }
        match s.parse::<f32>() {
            Ok(t) if t.is_finite() => Position::At(t),
            _ => Position::Label(s.to_string()),
        }
    }

    fn invalid(s: &str) -> Position {
        log::warn!("unparseable timeline offset {:?}; placing step sequentially", s);
        Position::Sequential
    }
}

impl From<&str> for Position {
    fn from(s: &str) -> Self {
        Position::parse(s)
    }
}

impl From<f32> for Position {
    fn from(t: f32) -> Self {
        Position::At(t)
    }
}

/// A non-visual side effect fired when the playhead reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Stop the background channel and start the main track.
    SwitchToMain,
    /// Start rotating the configured gallery image.
    StartGallery,
}

/// What a step does.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Animate every element matching the selector at once.
    Tween {
        mode: TweenMode,
        from: Option<Props>,
        to: Option<Props>,
    },
    /// Animate matching elements one after another, `each` seconds apart.
    Stagger {
        mode: TweenMode,
        from: Option<Props>,
        to: Option<Props>,
        each: f32,
    },
    Effect(Effect),
}

/// One entry in a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Target selector; empty for effect steps.
    pub selector: String,
    /// Per-target duration in seconds (0 for effects).
    pub duration: f32,
    pub kind: StepKind,
    pub position: Position,
}

/// Ordered list of steps, built GSAP-style:
///
/// ```ignore
/// let schedule = Schedule::new()
///     .from(".one", 0.7, Props::new().opacity(0.0).y(10.0))
///     .to(".one", 0.7, Props::new().opacity(0.0)).at("+=2.5")
///     .call(Effect::SwitchToMain);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    steps: Vec<Step>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, selector: &str, duration: f32, kind: StepKind) -> Self {
        self.steps.push(Step {
            selector: selector.to_string(),
            duration,
            kind,
            position: Position::Sequential,
        });
        self
    }

    pub fn to(self, selector: &str, duration: f32, to: Props) -> Self {
        self.push(selector, duration, StepKind::Tween { mode: TweenMode::To, from: None, to: Some(to) })
    }

    pub fn from(self, selector: &str, duration: f32, from: Props) -> Self {
        self.push(selector, duration, StepKind::Tween { mode: TweenMode::From, from: Some(from), to: None })
    }

    pub fn from_to(self, selector: &str, duration: f32, from: Props, to: Props) -> Self {
        self.push(
            selector,
            duration,
            StepKind::Tween { mode: TweenMode::FromTo, from: Some(from), to: Some(to) },
        )
    }

    pub fn stagger_to(self, selector: &str, duration: f32, to: Props, each: f32) -> Self {
        self.push(
            selector,
            duration,
            StepKind::Stagger { mode: TweenMode::To, from: None, to: Some(to), each },
        )
    }

    pub fn stagger_from(self, selector: &str, duration: f32, from: Props, each: f32) -> Self {
        self.push(
            selector,
            duration,
            StepKind::Stagger { mode: TweenMode::From, from: Some(from), to: None, each },
        )
    }

    pub fn stagger_from_to(self, selector: &str, duration: f32, from: Props, to: Props, each: f32) -> Self {
        self.push(
            selector,
            duration,
            StepKind::Stagger { mode: TweenMode::FromTo, from: Some(from), to: Some(to), each },
        )
    }

    /// Fire an effect at this point of the timeline.
    pub fn call(self, effect: Effect) -> Self {
        self.push("", 0.0, StepKind::Effect(effect))
    }

    /// Set the position of the most recently added step.
    pub fn at(mut self, position: impl Into<Position>) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.position = position.into();
        }
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Every selector a step targets, deduplicated and sorted.
    pub fn selectors(&self) -> BTreeSet<&str> {
        self.steps
            .iter()
            .map(|s| s.selector.as_str())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
