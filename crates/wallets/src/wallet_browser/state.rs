use std::sync::Arc;

use alloy_primitives::{Address, ChainId};
use dapp_session::{ProviderError, TxEvent, TxEventSender};
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

use crate::wallet_browser::{
    queue::RequestQueue,
    types::{BrowserTransaction, Connection, ConnectionUpdate, TransactionResponse},
};

type AccountsResponder = oneshot::Sender<Result<Vec<Address>, ProviderError>>;

#[derive(Debug)]
pub(crate) struct BrowserWalletState {
    /// Token the page must present on every API call.
    session_token: Arc<String>,
    /// Whether the page found an injected wallet, `None` until it reports.
    detected: Mutex<Option<bool>>,
    /// Current information about the wallet connection.
    connection: Mutex<Connection>,
    /// Callers waiting for `eth_requestAccounts`.
    accounts: Mutex<Vec<AccountsResponder>>,
    /// Request/response queue for transactions.
    transactions: Mutex<RequestQueue<BrowserTransaction, TxEventSender>>,
    accounts_changed: broadcast::Sender<Vec<Address>>,
    network_changed: broadcast::Sender<ChainId>,
}

impl Default for BrowserWalletState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserWalletState {
    /// Create a new browser wallet state.
    pub fn new() -> Self {
        Self {
            session_token: Arc::new(Uuid::new_v4().to_string()),
            detected: Mutex::new(None),
            connection: Mutex::new(Connection::default()),
            accounts: Mutex::new(Vec::new()),
            transactions: Mutex::new(RequestQueue::new()),
            accounts_changed: broadcast::channel(16).0,
            network_changed: broadcast::channel(16).0,
        }
    }

    pub fn session_token(&self) -> Arc<String> {
        self.session_token.clone()
    }

    pub fn wallet_detected(&self) -> Option<bool> {
        *self.detected.lock()
    }

    /// Records whether the page found a wallet. Pending account requests fail without one.
    pub fn set_wallet_detected(&self, detected: bool) {
        *self.detected.lock() = Some(detected);
        if !detected {
            for responder in self.accounts.lock().drain(..) {
                let _ = responder.send(Err(ProviderError::NoWallet));
            }
        }
    }

    /// Check if wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().address.is_some()
    }

    /// Get current connection information.
    pub fn get_connection(&self) -> Connection {
        *self.connection.lock()
    }

    /// Queues an account request for the page.
    pub fn request_accounts(&self) -> oneshot::Receiver<Result<Vec<Address>, ProviderError>> {
        let (tx, rx) = oneshot::channel();
        self.accounts.lock().push(tx);
        rx
    }

    pub fn has_accounts_request(&self) -> bool {
        self.accounts.lock().iter().any(|responder| !responder.is_closed())
    }

    /// Drops responders whose caller stopped waiting.
    pub fn prune_accounts_requests(&self) {
        self.accounts.lock().retain(|responder| !responder.is_closed());
    }

    /// Applies an update reported by the page.
    ///
    /// Answers pending account requests, and notifies subscribers when an established connection
    /// switched account or chain.
    pub fn update_connection(&self, update: ConnectionUpdate) {
        let responders: Vec<_> = self.accounts.lock().drain(..).collect();

        if let Some(error) = update.error {
            debug!(%error, "account request failed");
            for responder in responders {
                let _ = responder.send(Err(error.clone().into()));
            }
            return;
        }

        let (previous, current) = {
            let mut connection = self.connection.lock();
            let previous = *connection;
            connection.address = update.address;
            connection.chain_id = update.chain_id.or(previous.chain_id);
            (previous, *connection)
        };

        for responder in responders {
            let _ = responder.send(Ok(current.address.into_iter().collect()));
        }

        if previous.address.is_some() && previous.address != current.address {
            debug!(previous = ?previous.address, current = ?current.address, "accounts changed");
            let _ = self.accounts_changed.send(current.address.into_iter().collect());
        }
        if let (Some(previous), Some(current)) = (previous.chain_id, current.chain_id)
            && previous != current
        {
            debug!(previous, current, "network changed");
            let _ = self.network_changed.send(current);
        }
    }

    pub fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<Address>> {
        self.accounts_changed.subscribe()
    }

    pub fn subscribe_network(&self) -> broadcast::Receiver<ChainId> {
        self.network_changed.subscribe()
    }

    /// Add a transaction request.
    pub fn add_transaction_request(&self, request: BrowserTransaction, events: TxEventSender) {
        self.transactions.lock().add_request(request.id, request, events);
    }

    /// Hands the next transaction request to the page, which now owns answering it.
    pub fn read_next_transaction_request(&self) -> Option<BrowserTransaction> {
        self.transactions.lock().take_request()
    }

    /// Removes a transaction the page never picked up, returning its event sender.
    ///
    /// Picked up transactions wait for the wallet as long as the user needs to sign.
    pub fn expire_transaction_request(&self, id: &Uuid) -> Option<TxEventSender> {
        let mut transactions = self.transactions.lock();
        if !transactions.has_request(id) {
            return None;
        }
        transactions.remove(id)
    }

    /// Forwards the page's answer to the submitter. Returns `false` for unknown ids.
    pub fn add_transaction_response(&self, response: TransactionResponse) -> bool {
        let id = response.id;
        let mut transactions = self.transactions.lock();
        if !transactions.contains(&id) {
            return false;
        }

        if let Some(error) = response.error {
            if let Some(events) = transactions.remove(&id) {
                events.send(TxEvent::Error(error));
            }
            return true;
        }
        if let Some(hash) = response.hash {
            if let Some(events) = transactions.responder(&id) {
                events.send(TxEvent::Broadcast(hash));
            }
        }
        if let Some(receipt) = response.receipt
            && let Some(events) = transactions.remove(&id)
        {
            events.send(TxEvent::Receipt(receipt));
        }
        true
    }
}
