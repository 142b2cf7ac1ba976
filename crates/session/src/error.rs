//! Error types of the session layer.

use alloy_primitives::utils::UnitsError;
use dapp_config::TokenKey;
use serde::{Deserialize, Serialize};

/// Error code returned by EIP-1193 providers when the user rejects a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// A structured JSON-RPC error as reported by a wallet or node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    /// The error a wallet returns when the user cancels a request.
    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "User rejected the request.")
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }

    /// Returns the message meant for humans.
    ///
    /// Nodes nest the revert reason under `data.message`; that one wins over the top-level
    /// message when present.
    pub fn human_message(&self) -> String {
        self.data
            .as_ref()
            .and_then(|data| data.get("message"))
            .and_then(|message| message.as_str())
            .unwrap_or(&self.message)
            .to_string()
    }
}

/// Errors reported by a [`WalletProvider`](crate::WalletProvider).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("no Ethereum wallet was detected")]
    NoWallet,
    #[error("the wallet did not return any account")]
    NoAccounts,
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("timed out waiting for the wallet")]
    Timeout,
    #[error("the wallet closed the request without an answer")]
    Closed,
}

impl ProviderError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc(err) if err.is_user_rejection())
    }

    /// Returns the message shown to the user.
    pub fn human_message(&self) -> String {
        match self {
            Self::Rpc(err) => err.human_message(),
            other => other.to_string(),
        }
    }
}

/// Errors of balance and allowance reads.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("the session is not connected")]
    NotConnected,
    #[error("token `{0}` is not configured on this network")]
    UnknownToken(TokenKey),
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("failed to decode `{method}` result: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: alloy_sol_types::Error,
    },
    #[error("the session changed before the read completed")]
    Superseded,
}

/// Errors converting a human-entered amount into smallest units.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("invalid amount `{amount}`: {source}")]
    Invalid {
        amount: String,
        #[source]
        source: UnitsError,
    },
    #[error("amount must not be negative: `{0}`")]
    Negative(String),
}
