//! Configuration system: YAML file + environment resolution.

pub mod loader;
pub mod types;


pub use loader::ConfigLoader;
pub use types::*;
