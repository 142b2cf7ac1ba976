use alloy_primitives::{Address, ChainId, TxHash, U256};
use dapp_config::TokenKey;
use std::collections::BTreeMap;

/// Connection state of a [`Session`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// No wallet is installed. Terminal until the process restarts.
    NoWallet,
}

/// A user-visible error, reduced to its message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Account access was refused or the network could not be read.
    Connection(String),
    /// A submitted transaction failed.
    Transaction(String),
}

impl SessionError {
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(message) | Self::Transaction(message) => message,
        }
    }
}

/// Latest known balance and allowance of one token, in smallest units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenReading {
    pub balance: Option<U256>,
    pub allowance: Option<U256>,
    /// The spender `allowance` was read against.
    pub allowance_spender: Option<Address>,
}

/// State of one wallet session.
///
/// A session is never patched across an account or network switch: it is replaced by a fresh one
/// with the next `generation`, so updates started by the old session can be told apart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub generation: u64,
    pub status: SessionStatus,
    pub connected_address: Option<Address>,
    /// `0` while unknown.
    pub network_id: ChainId,
    /// Hash of the transaction waiting to be mined.
    pub pending_transaction: Option<TxHash>,
    pub last_error: Option<SessionError>,
    /// One entry per token configured on `network_id`.
    pub token_readings: BTreeMap<TokenKey, TokenReading>,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }

    pub fn reading(&self, key: &str) -> Option<&TokenReading> {
        self.token_readings.get(key)
    }

    pub fn transaction_error(&self) -> Option<&str> {
        match &self.last_error {
            Some(SessionError::Transaction(message)) => Some(message),
            _ => None,
        }
    }

    pub fn network_error(&self) -> Option<&str> {
        match &self.last_error {
            Some(SessionError::Connection(message)) => Some(message),
            _ => None,
        }
    }

    /// Replaces the session with an empty one of the next generation.
    pub(crate) fn reset(&mut self) {
        *self = Self { generation: self.generation + 1, ..Default::default() };
    }
}
