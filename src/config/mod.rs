//! Conversion options and configuration files.

pub mod loader;
pub mod types;

pub use loader::{create_sample_config, load_config_file};
pub use types::*;
