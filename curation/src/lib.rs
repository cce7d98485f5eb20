//! # Curation
//!
//! Configuration, dependency wiring and error handling around the curation
//! core, shared by the `curation` maintenance binary.
//!
//! ## Modules
//!
//! - [`config`]: environment settings and dependency initialization
//! - [`errors`]: the application error type

pub mod config;
pub mod errors;

pub use config::{Dependencies, LogFormat, Settings};
pub use errors::AppError;
