//! # SQLChain Node Runtime
//!
//! Library half of the `node-runtime` binary.
//!
//! ## Modules
//!
//! - `container/` - Configuration (defaults, JSON file, `SC_*` env)
//! - `genesis/` - Node identity file and genesis bootstrap
//!
//! ## Commands
//!
//! | Command  | Effect                                                        |
//! |----------|---------------------------------------------------------------|
//! | `init`   | Mine an identity, sign genesis, create the chain, save the key |
//! | `status` | Load the chain and report its checkpoint                      |

pub mod container;
pub mod genesis;

use anyhow::{bail, Context, Result};
use sc_02_sqlchain::{Block, Chain, ChainContext, KeyValueStore, State};
use shared_types::{Hash, NodeId};
use std::fmt;

use crate::container::{NodeConfig, StorageBackend};
use crate::genesis::{bootstrap_genesis, NodeIdentity};

/// Summary of an opened chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    pub state: State,
    pub genesis_hash: Hash,
    pub producer: NodeId,
    /// `Some(true)` when the local identity produced genesis and it verifies
    /// against that identity; `None` without an identity file.
    pub identity_verified: Option<bool>,
}

impl fmt::Display for ChainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "height:   {}", self.state.height)?;
        writeln!(f, "head:     0x{}", hex::encode(self.state.head))?;
        writeln!(f, "genesis:  0x{}", hex::encode(self.genesis_hash))?;
        write!(f, "producer: {}", self.producer)?;
        match self.identity_verified {
            Some(true) => write!(f, "\nidentity: verified"),
            Some(false) => write!(f, "\nidentity: MISMATCH"),
            None => Ok(()),
        }
    }
}

/// The node runtime.
pub struct NodeRuntime {
    config: NodeConfig,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    fn context(&self) -> ChainContext {
        ChainContext::in_memory(self.config.identity.min_node_id_difficulty)
    }

    /// Create the chain with a freshly mined identity.
    ///
    /// Refuses to run when an identity file already exists. The key is
    /// saved only once genesis is durable.
    pub fn init(&self) -> Result<ChainReport> {
        let key_file = self.config.key_file();
        if key_file.exists() {
            bail!(
                "node already initialized: identity file {} exists",
                key_file.display()
            );
        }

        let ctx = self.context();
        let (identity, genesis) =
            bootstrap_genesis(&self.config, &ctx).context("failed to build genesis block")?;

        let report = match self.config.storage.backend {
            StorageBackend::File => {
                let chain = Chain::new_chain(&self.config.chain_config(), &genesis, &ctx)?;
                finish(chain, &genesis, Some(&identity), &ctx)?
            }
            #[cfg(feature = "rocksdb")]
            StorageBackend::RocksDb => {
                let chain =
                    Chain::new_chain_with_store(self.open_rocksdb()?, &genesis, &ctx)?;
                finish(chain, &genesis, Some(&identity), &ctx)?
            }
        };

        identity
            .save(&key_file)
            .context("genesis stored but identity could not be saved")?;
        tracing::info!("Chain initialized at {}", report.state);
        Ok(report)
    }

    /// Open the existing chain and summarize it.
    pub fn status(&self) -> Result<ChainReport> {
        let key_file = self.config.key_file();
        let identity = if key_file.exists() {
            Some(NodeIdentity::load(&key_file)?)
        } else {
            tracing::warn!("No identity file at {}", key_file.display());
            None
        };

        let ctx = self.context();
        if let Some(identity) = &identity {
            identity.register(ctx.key_store.as_ref())?;
        }

        match self.config.storage.backend {
            StorageBackend::File => {
                let chain = Chain::load_chain(&self.config.chain_config())?;
                let genesis = chain.block_at(0)?;
                finish(chain, &genesis, identity.as_ref(), &ctx)
            }
            #[cfg(feature = "rocksdb")]
            StorageBackend::RocksDb => {
                let chain = Chain::load_chain_with_store(self.open_rocksdb()?)?;
                if self.config.storage.verify_on_load {
                    chain.verify_all_headers()?;
                }
                let genesis = chain.block_at(0)?;
                finish(chain, &genesis, identity.as_ref(), &ctx)
            }
        }
    }

    #[cfg(feature = "rocksdb")]
    fn open_rocksdb(&self) -> Result<sc_02_sqlchain::RocksDbStore> {
        let config = sc_02_sqlchain::RocksDbConfig {
            path: self.config.storage.data_dir.join("rocksdb"),
            sync_writes: self.config.storage.sync_writes,
            ..Default::default()
        };
        Ok(sc_02_sqlchain::RocksDbStore::open(config)?)
    }
}

fn finish<KV: KeyValueStore>(
    chain: Chain<KV>,
    genesis: &Block,
    identity: Option<&NodeIdentity>,
    ctx: &ChainContext,
) -> Result<ChainReport> {
    let producer = genesis.signed_header.producer();
    let identity_verified = identity.map(|identity| {
        identity.node_id() == producer && genesis.verify_as_genesis(ctx).is_ok()
    });
    let report = ChainReport {
        state: chain.state(),
        genesis_hash: chain.genesis_hash(),
        producer,
        identity_verified,
    };
    chain.close()?;
    Ok(report)
}
