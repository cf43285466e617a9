// file: src/config/mod.rs
// description: configuration module exports
// reference: internal module structure

pub mod configuration;
pub mod entity;

pub use configuration::ConfigurationManager;
pub use entity::{AppConfig, DataIngestionConfig, Params};
