use alloy_primitives::{Address, ChainId, TxHash};
use alloy_rpc_types::TransactionRequest;
use dapp_session::{RpcError, TxReceipt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope of every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum BrowserApiResponse<T = ()> {
    Ok(T),
    Error { message: String },
}

impl<T> BrowserApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}

/// What the page knows about the wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub address: Option<Address>,
    pub chain_id: Option<ChainId>,
}

impl Connection {
    pub fn new(address: Address, chain_id: ChainId) -> Self {
        Self { address: Some(address), chain_id: Some(chain_id) }
    }
}

/// Body of `POST /api/wallet`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalletDetection {
    pub detected: bool,
}

/// Body of `POST /api/connection`.
///
/// Sent after `eth_requestAccounts` and on every `accountsChanged` or `chainChanged`. A failed
/// account request carries the wallet's `error` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub chain_id: Option<ChainId>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl From<Connection> for ConnectionUpdate {
    fn from(connection: Connection) -> Self {
        Self { address: connection.address, chain_id: connection.chain_id, error: None }
    }
}

/// A transaction waiting for the page to send it through the wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserTransaction {
    pub id: Uuid,
    #[serde(flatten)]
    pub request: TransactionRequest,
}

/// Body of `POST /api/transaction/response`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    #[serde(default)]
    pub hash: Option<TxHash>,
    #[serde(default)]
    pub receipt: Option<TxReceipt>,
    #[serde(default)]
    pub error: Option<RpcError>,
}
