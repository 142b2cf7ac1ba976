use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt};

/// Logical name of a token section, e.g. `weth` or `dummyERC20`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenKey(String);

impl TokenKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TokenKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for TokenKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for TokenKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contracts deployed on a single chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tokens tracked by the session, in display order.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    /// Root chain bridge contracts, if the chain has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<BridgeConfig>,
}

impl NetworkConfig {
    /// Returns the token declared under `key`.
    pub fn token(&self, key: &TokenKey) -> Option<&TokenConfig> {
        self.tokens.iter().find(|token| token.key == *key)
    }

    /// Returns the display name, falling back to the chain id.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.chain_id.to_string())
    }
}

/// A declarative token description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub key: TokenKey,
    pub address: Address,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Whether the token wraps the native currency and accepts payable `deposit()` calls.
    #[serde(default)]
    pub wrapped_native: bool,
    /// Spender whose allowance is read when the session connects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spender: Option<Address>,
}

impl TokenConfig {
    pub fn new(key: impl Into<TokenKey>, address: Address) -> Self {
        Self {
            key: key.into(),
            address,
            decimals: default_decimals(),
            wrapped_native: false,
            spender: None,
        }
    }

    pub fn wrapped_native(mut self) -> Self {
        self.wrapped_native = true;
        self
    }

    pub fn with_spender(mut self, spender: Address) -> Self {
        self.spender = Some(spender);
        self
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Root chain side of a PoS bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub root_chain_manager: Address,
    /// Predicate contract that pulls ERC-20 tokens on deposit; it needs an allowance.
    pub erc20_predicate: Address,
}

const fn default_decimals() -> u8 {
    18
}
