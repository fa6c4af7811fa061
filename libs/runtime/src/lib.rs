//! Process-level plumbing shared by the SOS server: layered configuration,
//! logging bootstrap, home directory resolution and shutdown signals.

pub mod config;
pub mod logging;
pub mod paths;
pub mod shutdown;

pub use config::{
    AppConfig, CliArgs, DatabaseConfig, Environment, LoggingConfig, Section, ServerConfig,
};
