//! In-memory wallet and chain used by the controller tests.

use crate::{
    ChainClient, ProviderError, RpcError, TxEvent, TxEvents, TxReceipt, WalletProvider,
    contracts::{IERC20, IRootChainManager, IWETH},
};
use alloy_primitives::{Address, Bytes, ChainId, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::{Notify, broadcast};

/// Token ledger answering `balanceOf` and `allowance`.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

#[derive(Debug, Default)]
struct ChainState {
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    failure: Option<RpcError>,
    calls: usize,
}

impl MockChain {
    pub(crate) fn set_balance(&self, token: Address, owner: Address, value: U256) {
        self.state.lock().balances.insert((token, owner), value);
    }

    pub(crate) fn balance(&self, token: Address, owner: Address) -> U256 {
        self.state.lock().balances.get(&(token, owner)).copied().unwrap_or_default()
    }

    /// Makes every following call fail with `err`.
    pub(crate) fn fail_with(&self, err: RpcError) {
        self.state.lock().failure = Some(err);
    }

    pub(crate) fn calls(&self) -> usize {
        self.state.lock().calls
    }

    /// Applies the state change of a mined transaction.
    fn apply(&self, request: &TransactionRequest) {
        let (Some(from), Some(to)) = (request.from, target(request)) else { return };
        let input = input(request);
        let value = request.value.unwrap_or_default();
        let mut state = self.state.lock();

        if input.starts_with(&IERC20::approveCall::SELECTOR) {
            if let Ok(call) = IERC20::approveCall::abi_decode_raw(&input[4..]) {
                state.allowances.insert((to, from, call.spender), call.amount);
            }
        } else if input.starts_with(&IWETH::depositCall::SELECTOR) {
            *state.balances.entry((to, from)).or_default() += value;
        } else if input.starts_with(&IRootChainManager::depositForCall::SELECTOR)
            && let Ok(call) = IRootChainManager::depositForCall::abi_decode_raw(&input[4..])
        {
            let amount = U256::abi_decode(&call.depositData).unwrap_or_default();
            let balance = state.balances.entry((call.rootToken, call.user)).or_default();
            *balance = balance.saturating_sub(amount);
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn call(&self, request: TransactionRequest) -> Result<Bytes, RpcError> {
        let mut state = self.state.lock();
        state.calls += 1;
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }

        let to = target(&request).unwrap_or_default();
        let input = input(&request);
        let invalid = |err: alloy_sol_types::Error| RpcError::new(-32602, err.to_string());
        let value = if input.starts_with(&IERC20::balanceOfCall::SELECTOR) {
            let call = IERC20::balanceOfCall::abi_decode_raw(&input[4..]).map_err(invalid)?;
            state.balances.get(&(to, call.owner)).copied().unwrap_or_default()
        } else if input.starts_with(&IERC20::allowanceCall::SELECTOR) {
            let call = IERC20::allowanceCall::abi_decode_raw(&input[4..]).map_err(invalid)?;
            state.allowances.get(&(to, call.owner, call.spender)).copied().unwrap_or_default()
        } else {
            return Err(RpcError::new(3, "execution reverted"));
        };
        Ok(value.abi_encode().into())
    }
}

/// How the mock wallet answers the next transaction.
#[derive(Debug)]
pub(crate) enum Script {
    /// Broadcast and mine.
    Confirm,
    /// The user cancels in the wallet.
    RejectByUser,
    /// The wallet reports an error before broadcasting.
    Fail(&'static str),
    /// Broadcast, then mined with a failed status.
    Revert,
    /// Broadcast, then mined once notified.
    Hold(Arc<Notify>),
    /// Broadcast, then the wallet reports a user rejection instead of a receipt.
    BroadcastThenReject,
}

#[derive(Debug)]
struct WalletState {
    installed: bool,
    refuse: bool,
    accounts: Vec<Address>,
    chain_id: ChainId,
    scripts: VecDeque<Script>,
    sent: Vec<TransactionRequest>,
    account_requests: usize,
    subscriptions: usize,
    nonce: u8,
}

/// A scripted EIP-1193 wallet.
#[derive(Debug)]
pub(crate) struct MockWallet {
    chain: MockChain,
    state: Mutex<WalletState>,
    accounts_tx: broadcast::Sender<Vec<Address>>,
    network_tx: broadcast::Sender<ChainId>,
}

impl MockWallet {
    pub(crate) fn new(chain: MockChain, account: Address, chain_id: ChainId) -> Self {
        Self {
            chain,
            state: Mutex::new(WalletState {
                installed: true,
                refuse: false,
                accounts: vec![account],
                chain_id,
                scripts: VecDeque::new(),
                sent: Vec::new(),
                account_requests: 0,
                subscriptions: 0,
                nonce: 0,
            }),
            accounts_tx: broadcast::channel(16).0,
            network_tx: broadcast::channel(16).0,
        }
    }

    /// A browser without any wallet.
    pub(crate) fn missing(chain: MockChain) -> Self {
        let wallet = Self::new(chain, Address::ZERO, 0);
        wallet.state.lock().installed = false;
        wallet
    }

    /// Makes the user refuse account access.
    pub(crate) fn refuse(&self) {
        self.state.lock().refuse = true;
    }

    pub(crate) fn script(&self, script: Script) {
        self.state.lock().scripts.push_back(script);
    }

    pub(crate) fn switch_account(&self, account: Address) {
        self.state.lock().accounts = vec![account];
        let _ = self.accounts_tx.send(vec![account]);
    }

    pub(crate) fn switch_network(&self, chain_id: ChainId) {
        self.state.lock().chain_id = chain_id;
        let _ = self.network_tx.send(chain_id);
    }

    pub(crate) fn sent(&self) -> Vec<TransactionRequest> {
        self.state.lock().sent.clone()
    }

    pub(crate) fn account_requests(&self) -> usize {
        self.state.lock().account_requests
    }

    /// Number of `accountsChanged` subscriptions taken so far.
    pub(crate) fn subscriptions(&self) -> usize {
        self.state.lock().subscriptions
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let mut state = self.state.lock();
        state.account_requests += 1;
        if !state.installed {
            return Err(ProviderError::NoWallet);
        }
        if state.refuse {
            return Err(RpcError::user_rejected().into());
        }
        Ok(state.accounts.clone())
    }

    async fn network_id(&self) -> Result<ChainId, ProviderError> {
        Ok(self.state.lock().chain_id)
    }

    fn accounts_changed(&self) -> broadcast::Receiver<Vec<Address>> {
        self.state.lock().subscriptions += 1;
        self.accounts_tx.subscribe()
    }

    fn network_changed(&self) -> broadcast::Receiver<ChainId> {
        self.network_tx.subscribe()
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TxEvents, ProviderError> {
        let (script, hash) = {
            let mut state = self.state.lock();
            state.sent.push(request.clone());
            state.nonce += 1;
            let script = state.scripts.pop_front().unwrap_or(Script::Confirm);
            (script, TxHash::with_last_byte(state.nonce))
        };

        let (tx, events) = TxEvents::channel();
        match script {
            Script::Confirm => {
                tx.send(TxEvent::Broadcast(hash));
                self.chain.apply(&request);
                tx.send(mined(hash, true));
            }
            Script::RejectByUser => return Err(RpcError::user_rejected().into()),
            Script::Fail(message) => {
                tx.send(TxEvent::Error(RpcError::new(-32603, message)));
            }
            Script::Revert => {
                tx.send(TxEvent::Broadcast(hash));
                tx.send(mined(hash, false));
            }
            Script::BroadcastThenReject => {
                tx.send(TxEvent::Broadcast(hash));
                tx.send(TxEvent::Error(RpcError::user_rejected()));
            }
            Script::Hold(release) => {
                tx.send(TxEvent::Broadcast(hash));
                let chain = self.chain.clone();
                tokio::spawn(async move {
                    release.notified().await;
                    chain.apply(&request);
                    tx.send(mined(hash, true));
                });
            }
        }
        Ok(events)
    }
}

fn mined(transaction_hash: TxHash, status: bool) -> TxEvent {
    TxEvent::Receipt(TxReceipt { transaction_hash, block_number: Some(1), status })
}

fn target(request: &TransactionRequest) -> Option<Address> {
    request.to.and_then(|to| to.to().copied())
}

fn input(request: &TransactionRequest) -> Bytes {
    request.input.input().cloned().unwrap_or_default()
}
