use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, ChainId};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use dapp_session::{ProviderError, RpcError, TxEvent, TxEvents, WalletProvider};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::wallet_browser::{state::BrowserWalletState, types::BrowserTransaction};

/// EIP-1193 "Unauthorized": no account is connected.
const UNAUTHORIZED_CODE: i64 = 4100;
/// EIP-1193 "Disconnected": the wallet is not connected to any chain.
const DISCONNECTED_CODE: i64 = 4900;
const INTERNAL_ERROR_CODE: i64 = -32603;

/// [`WalletProvider`] backed by the wallet in the browser page of a
/// [`BrowserWalletServer`](crate::BrowserWalletServer).
#[derive(Clone, Debug)]
pub struct BrowserWalletProvider {
    state: Arc<BrowserWalletState>,
    timeout: Duration,
}

impl BrowserWalletProvider {
    pub(crate) fn new(state: Arc<BrowserWalletState>, timeout: Duration) -> Self {
        Self { state, timeout }
    }
}

#[async_trait]
impl WalletProvider for BrowserWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        if self.state.wallet_detected() == Some(false) {
            return Err(ProviderError::NoWallet);
        }

        let response = self.state.request_accounts();
        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(accounts)) => accounts,
            Ok(Err(_)) => Err(ProviderError::Closed),
            Err(_) => {
                self.state.prune_accounts_requests();
                Err(ProviderError::Timeout)
            }
        }
    }

    async fn network_id(&self) -> Result<ChainId, ProviderError> {
        self.state.get_connection().chain_id.ok_or_else(|| {
            RpcError::new(DISCONNECTED_CODE, "The wallet is not connected to any chain").into()
        })
    }

    fn accounts_changed(&self) -> broadcast::Receiver<Vec<Address>> {
        self.state.subscribe_accounts()
    }

    fn network_changed(&self) -> broadcast::Receiver<ChainId> {
        self.state.subscribe_network()
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TxEvents, ProviderError> {
        if !self.state.is_connected() {
            return Err(RpcError::new(UNAUTHORIZED_CODE, "The wallet is not connected").into());
        }

        let id = Uuid::new_v4();
        let (events_tx, events) = TxEvents::channel();
        self.state.add_transaction_request(BrowserTransaction { id, request }, events_tx);
        debug!(%id, "queued transaction for the wallet");

        // Expire the request if the page never picks it up.
        let state = self.state.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(events) = state.expire_transaction_request(&id) {
                warn!(%id, "transaction request timed out");
                let message = ProviderError::Timeout.to_string();
                events.send(TxEvent::Error(RpcError::new(INTERNAL_ERROR_CODE, message)));
            }
        });

        Ok(events)
    }
}
