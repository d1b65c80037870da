//! # Node Configuration
//!
//! Runtime parameters for the chain node.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. JSON config file (`--config <path>`)
//! 3. `SC_*` environment variables

use sc_02_sqlchain::{ChainConfig, DEFAULT_MIN_NODE_ID_DIFFICULTY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Highest identity difficulty the node accepts in configuration.
pub const MAX_NODE_ID_DIFFICULTY: u32 = 64;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Identity and genesis configuration.
    pub identity: IdentityConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SC_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SC_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("SC_SYNC_WRITES") {
            self.storage.sync_writes = parse_env("SC_SYNC_WRITES", &value)?;
        }
        if let Some(value) = lookup("SC_VERIFY_ON_LOAD") {
            self.storage.verify_on_load = parse_env("SC_VERIFY_ON_LOAD", &value)?;
        }
        if let Some(value) = lookup("SC_MIN_NODE_ID_DIFFICULTY") {
            self.identity.min_node_id_difficulty = parse_env("SC_MIN_NODE_ID_DIFFICULTY", &value)?;
        }
        if let Some(value) = lookup("SC_MINING_MAX_ITERATIONS") {
            self.identity.mining_max_iterations = parse_env("SC_MINING_MAX_ITERATIONS", &value)?;
        }
        if let Some(path) = lookup("SC_KEY_FILE") {
            self.identity.key_file = Some(PathBuf::from(path));
        }
        if let Some(filter) = lookup("SC_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.data_dir is empty".into()));
        }
        if self.identity.min_node_id_difficulty > MAX_NODE_ID_DIFFICULTY {
            return Err(ConfigError::Invalid(format!(
                "identity.min_node_id_difficulty {} exceeds {}",
                self.identity.min_node_id_difficulty, MAX_NODE_ID_DIFFICULTY
            )));
        }
        if self.identity.mining_max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "identity.mining_max_iterations must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Identity file location (defaults to `<data_dir>/node_key.json`).
    pub fn key_file(&self) -> PathBuf {
        self.identity
            .key_file
            .clone()
            .unwrap_or_else(|| self.storage.data_dir.join("node_key.json"))
    }

    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            data_dir: self.storage.data_dir.clone(),
            verify_on_load: self.storage.verify_on_load,
            sync_writes: self.storage.sync_writes,
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("environment variable {var} has invalid value {value:?}")]
    Env { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which `KeyValueStore` holds the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    #[cfg(feature = "rocksdb")]
    RocksDb,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory for the chain store.
    pub data_dir: PathBuf,
    /// Store implementation.
    pub backend: StorageBackend,
    /// fsync every committed block.
    pub sync_writes: bool,
    /// Re-verify every header signature on load.
    pub verify_on_load: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let chain = ChainConfig::default();
        Self {
            data_dir: chain.data_dir,
            backend: StorageBackend::default(),
            sync_writes: chain.sync_writes,
            verify_on_load: chain.verify_on_load,
        }
    }
}

/// Identity and genesis configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Leading zero bits required of a genesis producer id.
    pub min_node_id_difficulty: u32,
    /// Hash budget for mining the node identity.
    pub mining_max_iterations: u64,
    /// Where the node key and nonce are kept.
    pub key_file: Option<PathBuf>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            min_node_id_difficulty: DEFAULT_MIN_NODE_ID_DIFFICULTY,
            mining_max_iterations: 1 << 32,
            key_file: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.data_dir, PathBuf::from("./data/sqlchain"));
        assert_eq!(
            config.identity.min_node_id_difficulty,
            DEFAULT_MIN_NODE_ID_DIFFICULTY
        );
        assert_eq!(config.key_file(), PathBuf::from("./data/sqlchain/node_key.json"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = NodeConfig::default();
        config
            .apply_env_overrides(env(&[
                ("SC_DATA_DIR", "/tmp/chain"),
                ("SC_SYNC_WRITES", "false"),
                ("SC_VERIFY_ON_LOAD", "true"),
                ("SC_MIN_NODE_ID_DIFFICULTY", "8"),
                ("SC_KEY_FILE", "/etc/sc/key.json"),
                ("SC_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/chain"));
        assert!(!config.storage.sync_writes);
        assert!(config.storage.verify_on_load);
        assert_eq!(config.identity.min_node_id_difficulty, 8);
        assert_eq!(config.key_file(), PathBuf::from("/etc/sc/key.json"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_bad_env_value_rejected() {
        let mut config = NodeConfig::default();
        let err = config
            .apply_env_overrides(env(&[("SC_MIN_NODE_ID_DIFFICULTY", "lots")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                var: "SC_MIN_NODE_ID_DIFFICULTY",
                ..
            }
        ));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        std::fs::write(
            &path,
            r#"{ "storage": { "data_dir": "/var/lib/sc" }, "identity": { "min_node_id_difficulty": 12 } }"#,
        )
        .unwrap();

        let config = NodeConfig::from_file(&path).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/sc"));
        assert!(config.storage.sync_writes);
        assert_eq!(config.identity.min_node_id_difficulty, 12);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            NodeConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            NodeConfig::from_file(&dir.path().join("absent.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = NodeConfig::default();
        config.identity.min_node_id_difficulty = MAX_NODE_ID_DIFFICULTY + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = NodeConfig::default();
        config.identity.mining_max_iterations = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = NodeConfig::default();
        config.storage.data_dir = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_chain_config_mirrors_storage() {
        let mut config = NodeConfig::default();
        config.storage.verify_on_load = true;
        config.storage.sync_writes = false;

        let chain = config.chain_config();
        assert_eq!(chain.data_dir, config.storage.data_dir);
        assert!(chain.verify_on_load);
        assert!(!chain.sync_writes);
    }
}
