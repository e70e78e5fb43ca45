// timeline/mod.rs
//
// The animation timeline: property bags, placed tweens, the declarative
// schedule, the compiled playable sequence, and the greeting choreography.

pub mod props;
pub mod schedule;
pub mod script;
pub mod sequence;
pub mod tween;

pub use props::{Property, Props, Value};
pub use schedule::{Effect, Position, Schedule, Step, StepKind};
pub use script::{greeting_schedule, span_selector, SEGMENTED_SELECTORS};
pub use sequence::Timeline;
pub use tween::{stagger_duration, Tween, TweenMode, TweenTarget, DEFAULT_EASE};
