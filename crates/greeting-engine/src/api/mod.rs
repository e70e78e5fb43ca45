pub mod config;
pub mod context;
pub mod page;
pub mod types;
