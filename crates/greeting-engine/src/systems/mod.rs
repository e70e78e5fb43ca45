pub mod gallery;
pub mod overlay;
pub mod text;
