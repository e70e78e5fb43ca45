pub mod clock;
pub mod listeners;
pub mod scene;
pub mod style;
