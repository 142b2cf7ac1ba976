//! Config error types.

use crate::TokenKey;

/// Errors returned when loading a [`Config`](crate::Config).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Extract(#[from] figment::Error),
    #[error("network {0} is declared more than once")]
    DuplicateNetwork(u64),
    #[error("token `{key}` is declared more than once for network {chain_id}")]
    DuplicateToken { chain_id: u64, key: TokenKey },
}
