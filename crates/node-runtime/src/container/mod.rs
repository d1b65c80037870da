//! Node configuration container.

pub mod config;

pub use config::{
    ConfigError, IdentityConfig, LoggingConfig, NodeConfig, StorageBackend, StorageConfig,
};
