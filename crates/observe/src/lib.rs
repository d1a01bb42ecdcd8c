//! Logging setup for applications embedding the SDK. The library crates only
//! emit `tracing` events; installing a subscriber is left to the application.
mod config;
pub mod tracing;

pub use config::Config;
