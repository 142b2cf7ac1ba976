//! # dapp-config
//!
//! Bridge dapp configuration.
//!
//! The configuration is a per-network address book: for every chain id it lists the tokens the
//! session tracks and, optionally, the bridge contracts available on that chain. A network that is
//! missing from the book simply has no sections.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use figment::{
    Figment, Provider,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

mod defaults;

pub mod error;
pub use error::ConfigError;

mod network;
pub use network::{BridgeConfig, NetworkConfig, TokenConfig, TokenKey};

// reexport so cli types can implement `figment::Provider` to easily merge their arguments
pub use figment;

/// Bridge dapp configuration
///
/// # Defaults
///
/// All values have a default; [`Config::default()`] returns them, including the built-in address
/// book. [`Config::load()`] starts from the defaults and merges, in order, the `dapp.toml` file of
/// the current directory and the `DAPP_`-prefixed environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint used for read-only contract calls.
    pub rpc_url: String,
    /// Port of the local browser wallet bridge. `0` picks an ephemeral port.
    pub port: u16,
    /// Seconds to wait for the browser wallet to answer a request.
    pub timeout: u64,
    /// The address book, one entry per supported chain.
    pub networks: Vec<NetworkConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: Self::DEFAULT_RPC_URL.to_string(),
            port: 0,
            timeout: 300,
            networks: defaults::networks(),
        }
    }
}

impl Config {
    /// The default file name looked up in the current directory.
    pub const FILE_NAME: &'static str = "dapp.toml";

    /// The environment variable prefix.
    pub const ENV_PREFIX: &'static str = "DAPP_";

    /// The endpoint used when none is configured.
    pub const DEFAULT_RPC_URL: &'static str = "http://localhost:8545";

    /// Loads the config from `dapp.toml` in the current directory and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_provider(Self::figment(None::<PathBuf>))
    }

    /// Loads the config using the given file instead of `dapp.toml`.
    pub fn load_with_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_provider(Self::figment(Some(path)))
    }

    /// Extracts a validated config from any figment provider.
    pub fn from_provider<T: Provider>(provider: T) -> Result<Self, ConfigError> {
        trace!("load config with provider: {:?}", provider.metadata());
        let config: Self = Figment::from(provider).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the layered figment, without extracting it.
    ///
    /// Callers can merge their own providers on top, e.g. command line arguments.
    pub fn figment(file: Option<impl AsRef<Path>>) -> Figment {
        let file = file
            .map(|path| path.as_ref().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME));
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(Self::ENV_PREFIX).only(&["rpc_url", "port", "timeout"]))
    }

    /// Returns the address book entry for the given chain.
    pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|network| network.chain_id == chain_id)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut chains = HashSet::new();
        for network in &self.networks {
            if !chains.insert(network.chain_id) {
                return Err(ConfigError::DuplicateNetwork(network.chain_id));
            }
            let mut keys = HashSet::new();
            for token in &network.tokens {
                if !keys.insert(&token.key) {
                    return Err(ConfigError::DuplicateToken {
                        chain_id: network.chain_id,
                        key: token.key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
