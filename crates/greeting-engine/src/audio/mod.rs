// audio/mod.rs
//
// Background and main audio channels and the controller that switches between them.

pub mod channel;
pub mod controller;

pub use channel::{AudioChannel, PendingPlay, PlayIntent};
pub use controller::AudioController;
