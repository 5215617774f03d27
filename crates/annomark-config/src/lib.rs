pub mod config;
pub mod error;

pub use config::{Config, PartialConfig};
pub use error::ConfigError;
