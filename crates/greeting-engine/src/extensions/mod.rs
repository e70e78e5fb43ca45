// extensions/mod.rs
//
// Easing curves shared by the timeline's tweens.

pub mod easing;

pub use easing::{Easing, lerp};
