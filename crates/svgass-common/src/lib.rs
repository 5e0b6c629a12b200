//! # svgass common
//!
//! Shared plumbing for the converter crates:
//!
//! - [`logging`]: `tracing-subscriber` setup for binaries
//! - [`ConvertConfig`]: every tunable of a conversion, JSON loadable
//! - [`ConfigError`]: what goes wrong while building a configuration

pub mod config;
pub mod error;
pub mod logging;

pub use config::{BatchMode, ConvertConfig, MAX_PRECISION};
pub use error::{ConfigError, ConfigResult};
pub use logging::{init_logging, LogConfig, LogFormat};
