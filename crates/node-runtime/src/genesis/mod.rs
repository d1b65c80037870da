//! # Genesis Bootstrap
//!
//! Creates a fresh node identity and the genesis block it signs.

pub mod identity;

pub use identity::{IdentityError, NodeIdentity};

use crate::container::NodeConfig;
use sc_02_sqlchain::{Block, ChainContext, GenesisBuildError, GenesisBuilder};
use shared_crypto::PrivateKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Build(#[from] GenesisBuildError),

    #[error("mined identity {0} missing from key store")]
    Unregistered(shared_types::NodeId),

    #[error("key store lookup failed: {0}")]
    KeyStore(#[from] sc_01_node_identity::KeyStoreError),
}

/// Generate a key, mine its identity and sign genesis with it.
///
/// The binding is registered in `ctx` as a side effect.
pub fn bootstrap_genesis(
    config: &NodeConfig,
    ctx: &ChainContext,
) -> Result<(NodeIdentity, Block), BootstrapError> {
    let key = PrivateKey::generate();
    tracing::info!(
        "Mining node identity (difficulty {}, budget {} hashes)...",
        ctx.min_node_id_difficulty,
        config.identity.mining_max_iterations
    );
    let genesis = GenesisBuilder::new(&key, ctx)
        .max_iterations(config.identity.mining_max_iterations)
        .build()?;

    let producer = genesis.signed_header.producer();
    let record = ctx
        .key_store
        .get_public_key(&producer)?
        .ok_or(BootstrapError::Unregistered(producer))?;

    Ok((NodeIdentity::from_parts(key, record.nonce), genesis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_identity_signs_genesis() {
        let mut config = NodeConfig::default();
        config.identity.min_node_id_difficulty = 2;
        let ctx = ChainContext::in_memory(config.identity.min_node_id_difficulty);

        let (identity, genesis) = bootstrap_genesis(&config, &ctx).unwrap();

        assert_eq!(identity.node_id(), genesis.signed_header.producer());
        assert_eq!(genesis.signed_header.signee(), identity.public_key());
        assert!(genesis.verify_as_genesis(&ctx).is_ok());
    }

    #[test]
    fn test_bootstrap_reports_exhausted_budget() {
        let mut config = NodeConfig::default();
        config.identity.mining_max_iterations = 1;
        let ctx = ChainContext::in_memory(64);

        assert!(matches!(
            bootstrap_genesis(&config, &ctx),
            Err(BootstrapError::Build(GenesisBuildError::Mine(_)))
        ));
    }
}
