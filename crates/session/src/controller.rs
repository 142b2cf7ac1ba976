//! The session controller.
//!
//! [`SessionController`] owns the single [`Session`] of the process and performs every
//! transition on it: connecting to the wallet, reading token state, tracking submitted
//! transactions and reacting to account and network switches.
//!
//! Every external call suspends the controller. State written after such a call is tagged with
//! the generation of the session that started it and dropped when the session was replaced in the
//! meantime, so a late receipt can never land in a newer session.

use crate::{
    ChainClient, ProviderError, ReadError, RpcError, Session, SessionError, SessionStatus,
    TokenReading, TxEvent, WalletProvider, contracts, listener::ListenerGuard,
    units::{self, NATIVE_DECIMALS},
};
use alloy_primitives::{Address, ChainId, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use dapp_config::{BridgeConfig, NetworkConfig, TokenConfig, TokenKey};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast::error::RecvError, watch};

/// Which side of the bridge a deposit uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeKind {
    /// Lock an ERC-20 token through its predicate.
    Erc20,
    /// Lock native currency.
    Ether,
}

/// How a submission ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    /// Mined successfully.
    Confirmed(TxHash),
    /// Cancelled by the user in the wallet.
    Rejected,
    /// Failed; the reason is in the session's transaction error.
    Failed,
    /// The session was replaced before the transaction settled.
    Superseded,
    /// Nothing was submitted because no session is connected.
    Unavailable,
}

/// Readings to refresh once a transaction is mined.
#[derive(Clone, Copy, Debug)]
enum Refresh {
    None,
    Balance,
    Allowance(Address),
    BalanceAndAllowance(Address),
}

/// What a submission needs to know about the session it runs in.
#[derive(Clone, Debug)]
struct Context {
    generation: u64,
    account: Address,
    token: TokenConfig,
    bridge: Option<BridgeConfig>,
}

/// Drives a [`Session`] through the wallet and chain capabilities.
///
/// Cloning is cheap; all clones drive the same session.
pub struct SessionController<W, C> {
    inner: Arc<Inner<W, C>>,
}

struct Inner<W, C> {
    wallet: W,
    client: C,
    networks: Vec<NetworkConfig>,
    state: watch::Sender<Session>,
    listeners: Mutex<Option<ListenerGuard>>,
}

impl<W, C> Clone for SessionController<W, C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<W: WalletProvider, C: ChainClient> SessionController<W, C> {
    /// Creates a controller with an empty, disconnected session.
    pub fn new(wallet: W, client: C, networks: Vec<NetworkConfig>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                wallet,
                client,
                networks,
                state,
                listeners: Mutex::new(None),
            }),
        }
    }

    pub fn wallet(&self) -> &W {
        &self.inner.wallet
    }

    pub fn client(&self) -> &C {
        &self.inner.client
    }

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Returns the address book entry of the connected network, if any.
    pub fn network(&self) -> Option<&NetworkConfig> {
        let network_id = self.inner.state.borrow().network_id;
        self.network_config(network_id)
    }

    /// Connects to the wallet and loads the initial readings.
    ///
    /// Does nothing unless the session is disconnected. Failures end up in the session: a missing
    /// wallet moves it to [`SessionStatus::NoWallet`], any other failure records a connection
    /// error and leaves it disconnected.
    pub async fn connect(&self) {
        let Some(generation) = self.begin_connect() else { return };

        let (account, network_id) = match self.request_session().await {
            Ok(session) => session,
            Err(ProviderError::NoWallet) => {
                warn!("no wallet detected");
                self.update(generation, |session| session.status = SessionStatus::NoWallet);
                return;
            }
            Err(err) => {
                warn!(%err, "failed to connect wallet");
                self.update(generation, |session| {
                    session.status = SessionStatus::Disconnected;
                    session.last_error = Some(SessionError::Connection(err.human_message()));
                });
                return;
            }
        };

        let tokens = self
            .network_config(network_id)
            .map(|network| network.tokens.clone())
            .unwrap_or_default();

        {
            let mut listeners = self.inner.listeners.lock();
            let connected = self.update(generation, |session| {
                session.status = SessionStatus::Connected;
                session.connected_address = Some(account);
                session.network_id = network_id;
                session.last_error = None;
                session.token_readings = tokens
                    .iter()
                    .map(|token| (token.key.clone(), TokenReading::default()))
                    .collect();
            });
            if !connected {
                debug!(generation, "session replaced while connecting");
                return;
            }
            *listeners = Some(self.register_listeners(generation));
        }
        debug!(generation, %account, network_id, tokens = tokens.len(), "wallet connected");

        let reads = tokens.iter().map(|token| self.initial_read(token));
        futures::future::join_all(reads).await;
    }

    /// Reads the connected account's balance of `key`.
    pub async fn refresh_balance(&self, key: &TokenKey) -> Result<U256, ReadError> {
        let context = self.context(key)?;
        let output = self
            .inner
            .client
            .call(contracts::balance_of(context.token.address, context.account))
            .await?;
        let balance = contracts::decode_balance(&output)?;

        let updated = self.update(context.generation, |session| {
            if let Some(reading) = session.token_readings.get_mut(key) {
                reading.balance = Some(balance);
            }
        });
        if !updated {
            return Err(ReadError::Superseded);
        }
        debug!(%key, %balance, "balance updated");
        Ok(balance)
    }

    /// Reads how much `spender` may move of the connected account's `key` tokens.
    pub async fn refresh_allowance(
        &self,
        key: &TokenKey,
        spender: Address,
    ) -> Result<U256, ReadError> {
        let context = self.context(key)?;
        let output = self
            .inner
            .client
            .call(contracts::allowance(context.token.address, context.account, spender))
            .await?;
        let allowance = contracts::decode_allowance(&output)?;

        let updated = self.update(context.generation, |session| {
            if let Some(reading) = session.token_readings.get_mut(key) {
                reading.allowance = Some(allowance);
                reading.allowance_spender = Some(spender);
            }
        });
        if !updated {
            return Err(ReadError::Superseded);
        }
        debug!(%key, %spender, %allowance, "allowance updated");
        Ok(allowance)
    }

    /// Approves `spender` to move `amount` of `key` tokens.
    pub async fn submit_approve(
        &self,
        key: &TokenKey,
        spender: Address,
        amount: &str,
    ) -> TxOutcome {
        self.submit(key, Refresh::Allowance(spender), |context| {
            let value = parse_amount(amount, context.token.decimals)?;
            Ok(contracts::approve(context.token.address, context.account, spender, value))
        })
        .await
    }

    /// Wraps `amount` of native currency into `key`.
    pub async fn submit_deposit(&self, key: &TokenKey, amount: &str) -> TxOutcome {
        self.submit(key, Refresh::Balance, |context| {
            if !context.token.wrapped_native {
                return Err(format!("token `{}` does not accept deposits", context.token.key));
            }
            let value = parse_amount(amount, NATIVE_DECIMALS)?;
            Ok(contracts::deposit(context.token.address, context.account, value))
        })
        .await
    }

    /// Deposits `amount` into the bridge of the connected network.
    ///
    /// [`BridgeKind::Erc20`] locks `key` tokens and needs an allowance for the predicate;
    /// [`BridgeKind::Ether`] locks native currency through the bridge section `key` belongs to.
    pub async fn submit_bridge(
        &self,
        key: &TokenKey,
        amount: &str,
        kind: BridgeKind,
    ) -> TxOutcome {
        let refresh = match (kind, self.network().and_then(|network| network.bridge)) {
            (BridgeKind::Erc20, Some(bridge)) => {
                Refresh::BalanceAndAllowance(bridge.erc20_predicate)
            }
            _ => Refresh::None,
        };
        self.submit(key, refresh, |context| {
            let Some(bridge) = context.bridge else {
                return Err("the connected network has no bridge".to_string());
            };
            match kind {
                BridgeKind::Erc20 => {
                    let value = parse_amount(amount, context.token.decimals)?;
                    Ok(contracts::deposit_for(
                        bridge.root_chain_manager,
                        context.account,
                        context.token.address,
                        value,
                    ))
                }
                BridgeKind::Ether => {
                    let value = parse_amount(amount, NATIVE_DECIMALS)?;
                    Ok(contracts::deposit_ether_for(
                        bridge.root_chain_manager,
                        context.account,
                        value,
                    ))
                }
            }
        })
        .await
    }

    /// Clears the transaction error, if any.
    pub fn dismiss_transaction_error(&self) {
        self.inner.state.send_if_modified(|session| {
            if session.transaction_error().is_none() {
                return false;
            }
            session.last_error = None;
            true
        });
    }

    /// Clears the connection error, if any.
    pub fn dismiss_network_error(&self) {
        self.inner.state.send_if_modified(|session| {
            if session.network_error().is_none() {
                return false;
            }
            session.last_error = None;
            true
        });
    }

    /// The wallet switched accounts: start over.
    pub async fn handle_accounts_changed(&self) {
        debug!("accounts changed");
        self.reset();
        self.connect().await;
    }

    /// The wallet switched networks: start over.
    pub async fn handle_network_changed(&self) {
        debug!("network changed");
        self.reset();
        self.connect().await;
    }

    /// Discards the session and deregisters its listeners.
    pub fn reset(&self) {
        self.inner.state.send_modify(Session::reset);
        let listeners = self.inner.listeners.lock().take();
        if let Some(listeners) = listeners {
            trace!(generation = listeners.generation(), "session reset");
        }
    }

    fn begin_connect(&self) -> Option<u64> {
        let mut generation = None;
        self.inner.state.send_if_modified(|session| {
            if session.status != SessionStatus::Disconnected {
                return false;
            }
            session.status = SessionStatus::Connecting;
            generation = Some(session.generation);
            true
        });
        if generation.is_none() {
            debug!(status = ?self.inner.state.borrow().status, "connect ignored");
        }
        generation
    }

    async fn request_session(&self) -> Result<(Address, ChainId), ProviderError> {
        let accounts = self.inner.wallet.request_accounts().await?;
        let account = accounts.first().copied().ok_or(ProviderError::NoAccounts)?;
        let network_id = self.inner.wallet.network_id().await?;
        Ok((account, network_id))
    }

    /// Best-effort load of a token's readings; failures are logged only.
    async fn initial_read(&self, token: &TokenConfig) {
        if let Err(err) = self.refresh_balance(&token.key).await {
            warn!(token = %token.key, %err, "failed to read balance");
        }
        if let Some(spender) = token.spender
            && let Err(err) = self.refresh_allowance(&token.key, spender).await
        {
            warn!(token = %token.key, %spender, %err, "failed to read allowance");
        }
    }

    async fn submit<F>(&self, key: &TokenKey, refresh: Refresh, build: F) -> TxOutcome
    where
        F: FnOnce(&Context) -> Result<TransactionRequest, String>,
    {
        let context = match self.context(key) {
            Ok(context) => context,
            Err(ReadError::NotConnected) => {
                warn!(%key, "not connected, nothing submitted");
                return TxOutcome::Unavailable;
            }
            Err(err) => {
                let generation = self.inner.state.borrow().generation;
                return self.fail(generation, err.to_string());
            }
        };
        let generation = context.generation;

        self.update(generation, |session| {
            if session.transaction_error().is_some() {
                session.last_error = None;
            }
        });

        let request = match build(&context) {
            Ok(request) => request,
            Err(message) => return self.fail(generation, message),
        };

        let mut events = match self.inner.wallet.send_transaction(request).await {
            Ok(events) => events,
            Err(err) => return self.settle_error(generation, err),
        };

        let mut hash = None;
        while let Some(event) = events.next().await {
            trace!(?event, "transaction event");
            match event {
                TxEvent::Broadcast(tx_hash) => {
                    hash = Some(tx_hash);
                    let broadcast = self.update(generation, |session| {
                        session.pending_transaction = Some(tx_hash);
                    });
                    if !broadcast {
                        debug!(%tx_hash, "session replaced, dropping transaction");
                        return TxOutcome::Superseded;
                    }
                    debug!(%tx_hash, "transaction broadcast");
                }
                TxEvent::Receipt(receipt) if receipt.status => {
                    if !self.update(generation, |session| session.pending_transaction = None) {
                        return TxOutcome::Superseded;
                    }
                    debug!(
                        tx_hash = %receipt.transaction_hash,
                        block = ?receipt.block_number,
                        "transaction mined"
                    );
                    self.refresh(key, refresh).await;
                    return TxOutcome::Confirmed(receipt.transaction_hash);
                }
                TxEvent::Receipt(receipt) => {
                    let err = RpcError::new(-32000, "transaction reverted");
                    warn!(tx_hash = %receipt.transaction_hash, "transaction reverted");
                    return self.settle_error(generation, err.into());
                }
                TxEvent::Error(err) => return self.settle_error(generation, err.into()),
            }
        }

        debug!(?hash, "transaction events ended without a receipt");
        self.settle_error(generation, ProviderError::Closed)
    }

    /// Terminal failure of a submission. User rejections are silent.
    fn settle_error(&self, generation: u64, err: ProviderError) -> TxOutcome {
        if err.is_user_rejection() {
            debug!("transaction rejected by user");
            return if self.update(generation, |session| session.pending_transaction = None) {
                TxOutcome::Rejected
            } else {
                TxOutcome::Superseded
            };
        }
        self.fail(generation, err.human_message())
    }

    fn fail(&self, generation: u64, message: String) -> TxOutcome {
        error!(%message, "transaction failed");
        let updated = self.update(generation, |session| {
            session.pending_transaction = None;
            session.last_error = Some(SessionError::Transaction(message));
        });
        if updated { TxOutcome::Failed } else { TxOutcome::Superseded }
    }

    async fn refresh(&self, key: &TokenKey, refresh: Refresh) {
        let (balance, allowance) = match refresh {
            Refresh::None => (false, None),
            Refresh::Balance => (true, None),
            Refresh::Allowance(spender) => (false, Some(spender)),
            Refresh::BalanceAndAllowance(spender) => (true, Some(spender)),
        };
        if balance && let Err(err) = self.refresh_balance(key).await {
            warn!(%key, %err, "failed to refresh balance");
        }
        if let Some(spender) = allowance
            && let Err(err) = self.refresh_allowance(key, spender).await
        {
            warn!(%key, %spender, %err, "failed to refresh allowance");
        }
    }

    fn context(&self, key: &TokenKey) -> Result<Context, ReadError> {
        let (generation, account, network_id) = {
            let session = self.inner.state.borrow();
            match (session.status, session.connected_address) {
                (SessionStatus::Connected, Some(account)) => {
                    (session.generation, account, session.network_id)
                }
                _ => return Err(ReadError::NotConnected),
            }
        };
        let network = self.network_config(network_id);
        let token = network
            .and_then(|network| network.token(key))
            .cloned()
            .ok_or_else(|| ReadError::UnknownToken(key.clone()))?;
        let bridge = network.and_then(|network| network.bridge);
        Ok(Context { generation, account, token, bridge })
    }

    fn network_config(&self, network_id: ChainId) -> Option<&NetworkConfig> {
        self.inner.networks.iter().find(|network| network.chain_id == network_id)
    }

    /// Applies `f` if the session is still the one of `generation`.
    fn update(&self, generation: u64, f: impl FnOnce(&mut Session)) -> bool {
        self.inner.state.send_if_modified(|session| {
            if session.generation != generation {
                return false;
            }
            f(session);
            true
        })
    }

    /// Listens for account and network switches for the session of `generation`.
    fn register_listeners(&self, generation: u64) -> ListenerGuard {
        let mut accounts = self.inner.wallet.accounts_changed();
        let mut networks = self.inner.wallet.network_changed();
        let controller = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            loop {
                let change = tokio::select! {
                    res = accounts.recv() => match res {
                        Ok(addresses) => {
                            trace!(generation, ?addresses, "accountsChanged");
                            Change::Accounts
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            trace!(generation, skipped, "accountsChanged lagged");
                            Change::Accounts
                        }
                        Err(RecvError::Closed) => break,
                    },
                    res = networks.recv() => match res {
                        Ok(network_id) => {
                            trace!(generation, network_id, "networkChanged");
                            Change::Network
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            trace!(generation, skipped, "networkChanged lagged");
                            Change::Network
                        }
                        Err(RecvError::Closed) => break,
                    },
                };
                if !Self::dispatch(&controller, change) {
                    break;
                }
            }
            trace!(generation, "provider listeners stopped");
        });
        trace!(generation, "registered provider listeners");
        ListenerGuard::new(generation, task)
    }

    /// Handles a change on a detached task, since resetting the session drops the listener task
    /// that received it. Returns `false` once the controller is gone.
    fn dispatch(controller: &Weak<Inner<W, C>>, change: Change) -> bool {
        let Some(inner) = controller.upgrade() else { return false };
        let controller = Self { inner };
        tokio::spawn(async move {
            match change {
                Change::Accounts => controller.handle_accounts_changed().await,
                Change::Network => controller.handle_network_changed().await,
            }
        });
        true
    }
}

fn parse_amount(amount: &str, decimals: u8) -> Result<U256, String> {
    units::to_smallest_unit(amount, decimals).map_err(|err| err.to_string())
}

#[derive(Clone, Copy, Debug)]
enum Change {
    Accounts,
    Network,
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
