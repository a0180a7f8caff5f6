//! Logging initialization shared by the deployment binary and its tests.
pub mod config;
pub mod tracing;

pub use config::Config;
