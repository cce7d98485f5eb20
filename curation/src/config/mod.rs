//! Configuration module for the curation binary.
//! Reads settings from the environment and wires the core services.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings};
