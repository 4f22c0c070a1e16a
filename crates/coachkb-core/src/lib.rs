//! Shared data model, error taxonomy, configuration and collaborator traits.

#![deny(dead_code)]
#![deny(unused_variables)]

pub mod config;
pub mod error;
pub mod keywords;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::{CapturedError, Error, Result, Severity, Stage};
