// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod common;
pub mod logging;
pub mod telemetry;
pub mod validation;

pub use common::{create_directories, get_size, load_json, read_yaml, save_json};
pub use telemetry::StageTimer;
pub use validation::Validator;
