//! Configuration module
//!
//! Handles loading settings from YAML files and environment variables. Settings
//! are plain values passed to `SolrTemplate::initialize`; nothing is registered
//! globally.

mod settings;

pub use settings::*;
