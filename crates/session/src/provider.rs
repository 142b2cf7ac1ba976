//! Capabilities the session consumes: the injected wallet and the chain reader.

use crate::{ProviderError, RpcError};
use alloy_primitives::{Address, Bytes, ChainId, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};

/// An EIP-1193 style wallet: account access, network identity, change notifications and
/// transaction signing plus broadcast.
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Asks the user for account access, `eth_requestAccounts`.
    ///
    /// Returns [`ProviderError::NoWallet`] when no wallet is present at all.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// The chain the wallet is currently connected to.
    async fn network_id(&self) -> Result<ChainId, ProviderError>;

    /// Subscribes to `accountsChanged` notifications.
    fn accounts_changed(&self) -> broadcast::Receiver<Vec<Address>>;

    /// Subscribes to network change notifications.
    fn network_changed(&self) -> broadcast::Receiver<ChainId>;

    /// Signs and broadcasts a transaction, returning the stream of its lifecycle events.
    async fn send_transaction(&self, request: TransactionRequest)
    -> Result<TxEvents, ProviderError>;
}

/// Read-only access to contract state.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Executes an `eth_call` and returns the raw output.
    async fn call(&self, request: TransactionRequest) -> Result<Bytes, RpcError>;
}

/// Minimal receipt information the session needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// `false` if the transaction reverted.
    pub status: bool,
}

/// Lifecycle event of a submitted transaction.
#[derive(Clone, Debug, PartialEq)]
pub enum TxEvent {
    /// The wallet signed and broadcast the transaction.
    Broadcast(TxHash),
    /// The transaction was included in a block.
    Receipt(TxReceipt),
    /// The transaction failed, before or after broadcast.
    Error(RpcError),
}

/// Receiving half of a transaction's event stream.
#[derive(Debug)]
pub struct TxEvents {
    rx: mpsc::UnboundedReceiver<TxEvent>,
}

impl TxEvents {
    /// Creates a connected sender and event stream.
    pub fn channel() -> (TxEventSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TxEventSender { tx }, Self { rx })
    }

    /// Waits for the next event, `None` once the sender is gone.
    pub async fn next(&mut self) -> Option<TxEvent> {
        self.rx.recv().await
    }
}

/// Sending half of a transaction's event stream.
#[derive(Clone, Debug)]
pub struct TxEventSender {
    tx: mpsc::UnboundedSender<TxEvent>,
}

impl TxEventSender {
    /// Emits an event, returns `false` if nobody listens anymore.
    pub fn send(&self, event: TxEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}
