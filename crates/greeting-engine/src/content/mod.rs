// content/mod.rs
//
// Personalization document: parsing and application onto page elements.

pub mod customization;
pub mod error;

pub use customization::{ContentTarget, Customization, IMAGE_KEY};
pub use error::ContentError;
