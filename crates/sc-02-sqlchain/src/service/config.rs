use std::path::PathBuf;

/// Library-level chain configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Directory holding the durable store
    pub data_dir: PathBuf,
    /// Re-verify every header signature when loading
    pub verify_on_load: bool,
    /// fsync every committed batch
    pub sync_writes: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/sqlchain"),
            verify_on_load: false,
            sync_writes: true,
        }
    }
}

impl ChainConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Create config for testing (no fsync)
    pub fn for_testing(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            verify_on_load: true,
            sync_writes: false,
        }
    }
}
