//! Command-line front end: configuration and argument types for the `freight` binary.
pub mod args;
pub mod config;

pub use args::{parse_package, ShipmentArgs};
pub use config::{AppConfig, LogConfig, RateLimitConfig, DEFAULT_CONFIG_PATH};
