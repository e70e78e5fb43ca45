pub mod api;
pub mod audio;
pub mod content;
pub mod core;
pub mod extensions;
pub mod input;
pub mod systems;
pub mod timeline;

// Re-export key types at crate root for convenience
pub use api::config::{GalleryConfig, PageConfig};
pub use api::context::{AudioOp, HostCommand, HostContext, ListenerAction, TimerAction};
pub use api::page::{Page, PageLayout};
pub use api::types::{Channel, GestureKind, GestureTarget, ListenerId, PlayResult, TimerId};
pub use audio::{AudioChannel, AudioController, PlayIntent};
pub use content::{ContentError, ContentTarget, Customization, IMAGE_KEY};
pub use core::clock::TimerQueue;
pub use core::listeners::ListenerRegistry;
pub use core::scene::{Scene, StyleUpdate};
pub use core::style::{ComputedStyle, Declaration, ElementStyle, Rgba};
pub use input::queue::{InputEvent, InputQueue};
pub use systems::gallery::{GalleryHandle, MIN_INTERVAL_MS, SETTLE_DELAY_MS, SWAP_DELAY_MS, VISIBLE_CLASS};
pub use systems::overlay::{OverlayState, UnlockOverlay};
pub use systems::text::{segment, Segmentation, Segmented};
pub use timeline::{
    greeting_schedule, Effect, Position, Props, Schedule, Timeline, Tween, TweenMode,
};

// Extensions
pub use extensions::{Easing, lerp};
