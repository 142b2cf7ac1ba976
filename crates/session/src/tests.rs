use super::*;
use crate::{
    contracts::IRootChainManager,
    mock::{MockChain, MockWallet, Script},
};
use alloy_primitives::{TxKind, address};
use alloy_sol_types::{SolCall, SolValue};
use dapp_config::Config;
use std::time::Duration;
use tokio::sync::Notify;

const ACCOUNT: Address = address!("0xabc0000000000000000000000000000000000abc");
const OTHER: Address = address!("0xdef0000000000000000000000000000000000def");
const GOERLI: ChainId = 5;

type Controller = SessionController<MockWallet, MockChain>;

fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn ether(amount: u128) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
}

fn weth() -> TokenKey {
    TokenKey::from("weth")
}

fn dummy() -> TokenKey {
    TokenKey::from("dummyERC20")
}

fn token_address(chain_id: ChainId, key: &TokenKey) -> Address {
    Config::default().network(chain_id).unwrap().token(key).unwrap().address
}

fn goerli_bridge() -> BridgeConfig {
    Config::default().network(GOERLI).unwrap().bridge.unwrap()
}

fn setup(chain_id: ChainId) -> (Controller, MockChain) {
    init_tracing();
    let chain = MockChain::default();
    let wallet = MockWallet::new(chain.clone(), ACCOUNT, chain_id);
    (SessionController::new(wallet, chain.clone(), Config::default().networks), chain)
}

async fn connected(chain_id: ChainId) -> (Controller, MockChain) {
    let (controller, chain) = setup(chain_id);
    controller.connect().await;
    assert_eq!(controller.snapshot().status, SessionStatus::Connected);
    (controller, chain)
}

async fn wait_for(
    rx: &mut watch::Receiver<Session>,
    f: impl FnMut(&Session) -> bool,
) -> Session {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(f))
        .await
        .expect("timed out waiting for session")
        .expect("controller dropped")
        .clone()
}

#[tokio::test]
async fn connect_loads_balance() {
    let (controller, chain) = setup(GOERLI);
    chain.set_balance(token_address(GOERLI, &weth()), ACCOUNT, ether(1));
    controller.connect().await;

    let session = controller.snapshot();
    assert_eq!(session.status, SessionStatus::Connected);
    assert_eq!(session.connected_address, Some(ACCOUNT));
    assert_eq!(session.network_id, GOERLI);
    assert!(session.last_error.is_none());

    let weth = session.reading("weth").unwrap();
    assert_eq!(weth.balance.unwrap().to_string(), "1000000000000000000");
    assert!(weth.allowance.is_none());

    let dummy = session.reading("dummyERC20").unwrap();
    assert_eq!(dummy.balance, Some(U256::ZERO));
    assert_eq!(dummy.allowance, Some(U256::ZERO));
    assert_eq!(dummy.allowance_spender, Some(goerli_bridge().erc20_predicate));
}

#[tokio::test]
async fn unsupported_network_has_no_readings() {
    let (controller, chain) = connected(1).await;
    let session = controller.snapshot();
    assert_eq!(session.network_id, 1);
    assert!(session.token_readings.is_empty());
    assert!(controller.network().is_none());
    assert_eq!(chain.calls(), 0);

    let err = controller.refresh_balance(&weth()).await.unwrap_err();
    assert!(matches!(err, ReadError::UnknownToken(key) if key == weth()));
}

#[tokio::test]
async fn failed_reads_leave_session_connected() {
    let (controller, chain) = setup(GOERLI);
    chain.fail_with(RpcError::new(-32000, "header not found"));
    controller.connect().await;

    let session = controller.snapshot();
    assert_eq!(session.status, SessionStatus::Connected);
    assert!(session.last_error.is_none());
    assert!(session.token_readings.values().all(|reading| reading.balance.is_none()));
}

#[tokio::test]
async fn missing_wallet_is_terminal() {
    init_tracing();
    let chain = MockChain::default();
    let wallet = MockWallet::missing(chain.clone());
    let controller = SessionController::new(wallet, chain, Config::default().networks);

    controller.connect().await;
    assert_eq!(controller.snapshot().status, SessionStatus::NoWallet);

    controller.connect().await;
    assert_eq!(controller.snapshot().status, SessionStatus::NoWallet);
    assert_eq!(controller.wallet().account_requests(), 1);
}

#[tokio::test]
async fn refused_connection_records_error() {
    let (controller, _) = setup(GOERLI);
    controller.wallet().refuse();
    controller.connect().await;

    let session = controller.snapshot();
    assert_eq!(session.status, SessionStatus::Disconnected);
    assert_eq!(session.network_error(), Some("User rejected the request."));
    assert!(session.transaction_error().is_none());
    assert_eq!(controller.wallet().subscriptions(), 0);

    let mut rx = controller.subscribe();
    controller.dismiss_network_error();
    assert!(rx.has_changed().unwrap());
    let after = rx.borrow_and_update().clone();
    assert!(after.last_error.is_none());

    controller.dismiss_network_error();
    controller.dismiss_transaction_error();
    assert!(!rx.has_changed().unwrap());
    assert_eq!(controller.snapshot(), after);
}

#[tokio::test]
async fn reset_yields_fresh_session() {
    let (controller, _) = connected(GOERLI).await;
    controller.wallet().script(Script::Fail("nonce too low"));
    assert_eq!(controller.submit_deposit(&weth(), "1").await, TxOutcome::Failed);

    let before = controller.snapshot();
    assert!(before.last_error.is_some());

    controller.reset();
    similar_asserts::assert_eq!(
        controller.snapshot(),
        Session { generation: before.generation + 1, ..Default::default() }
    );

    let err = controller.refresh_balance(&weth()).await.unwrap_err();
    assert!(matches!(err, ReadError::NotConnected));
}

#[tokio::test]
async fn deposit_wraps_native_currency() {
    let (controller, chain) = connected(GOERLI).await;
    let token = token_address(GOERLI, &weth());
    let release = Arc::new(Notify::new());
    controller.wallet().script(Script::Hold(release.clone()));

    let mut rx = controller.subscribe();
    let task = tokio::spawn({
        let controller = controller.clone();
        async move {
            let key = weth();
            controller.submit_deposit(&key, "1.5").await
        }
    });

    let pending = wait_for(&mut rx, |session| session.pending_transaction.is_some()).await;
    let hash = pending.pending_transaction.unwrap();
    release.notify_one();
    assert_eq!(task.await.unwrap(), TxOutcome::Confirmed(hash));

    let session = controller.snapshot();
    assert!(session.pending_transaction.is_none());
    assert!(session.last_error.is_none());

    let sent = controller.wallet().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, Some(ACCOUNT));
    assert_eq!(sent[0].to, Some(TxKind::Call(token)));
    assert_eq!(sent[0].value, Some(U256::from(1_500_000_000_000_000_000u128)));

    let expected = U256::from(1_500_000_000_000_000_000u128);
    assert_eq!(chain.balance(token, ACCOUNT), expected);
    assert_eq!(session.reading("weth").unwrap().balance, Some(expected));
}

#[tokio::test]
async fn deposit_requires_wrapped_native_token() {
    let (controller, _) = connected(GOERLI).await;
    assert_eq!(controller.submit_deposit(&dummy(), "1").await, TxOutcome::Failed);
    assert_eq!(
        controller.snapshot().transaction_error(),
        Some("token `dummyERC20` does not accept deposits")
    );
    assert!(controller.wallet().sent().is_empty());
}

#[tokio::test]
async fn invalid_amount_is_not_submitted() {
    let (controller, _) = connected(GOERLI).await;
    assert_eq!(controller.submit_deposit(&weth(), "abc").await, TxOutcome::Failed);

    let session = controller.snapshot();
    assert!(session.transaction_error().unwrap().starts_with("invalid amount `abc`"));
    assert!(controller.wallet().sent().is_empty());
}

#[tokio::test]
async fn approve_updates_allowance() {
    let (controller, _) = connected(GOERLI).await;
    let spender = OTHER;

    let outcome = controller.submit_approve(&weth(), spender, "2").await;
    assert!(matches!(outcome, TxOutcome::Confirmed(_)));

    let reading = controller.snapshot().reading("weth").cloned().unwrap();
    assert_eq!(reading.allowance, Some(ether(2)));
    assert_eq!(reading.allowance_spender, Some(spender));

    assert_eq!(controller.refresh_allowance(&weth(), spender).await.unwrap(), ether(2));
    assert_eq!(controller.refresh_allowance(&weth(), ACCOUNT).await.unwrap(), U256::ZERO);
    assert_eq!(controller.snapshot().reading("weth").unwrap().allowance_spender, Some(ACCOUNT));
}

#[tokio::test]
async fn user_rejection_is_silent() {
    let (controller, _) = connected(GOERLI).await;
    controller.wallet().script(Script::RejectByUser);

    assert_eq!(controller.submit_deposit(&weth(), "1").await, TxOutcome::Rejected);
    let session = controller.snapshot();
    assert!(session.last_error.is_none());
    assert!(session.pending_transaction.is_none());
}

#[tokio::test]
async fn rejection_after_broadcast_is_silent() {
    let (controller, _) = connected(GOERLI).await;
    controller.wallet().script(Script::BroadcastThenReject);

    let outcome = controller.submit_approve(&dummy(), OTHER, "1").await;
    assert_eq!(outcome, TxOutcome::Rejected);
    assert_eq!(controller.wallet().sent().len(), 1);

    let session = controller.snapshot();
    assert!(session.pending_transaction.is_none());
    assert!(session.last_error.is_none());
    assert_eq!(session.status, SessionStatus::Connected);
    assert_eq!(controller.refresh_allowance(&dummy(), OTHER).await.unwrap(), U256::ZERO);
}

#[tokio::test]
async fn wallet_failure_is_recorded_until_dismissed() {
    let (controller, _) = connected(GOERLI).await;
    controller.wallet().script(Script::Fail("insufficient funds for gas"));

    assert_eq!(controller.submit_deposit(&weth(), "1").await, TxOutcome::Failed);
    let session = controller.snapshot();
    assert_eq!(session.transaction_error(), Some("insufficient funds for gas"));
    assert!(session.network_error().is_none());
    assert!(session.pending_transaction.is_none());

    controller.dismiss_transaction_error();
    let dismissed = controller.snapshot();
    assert!(dismissed.last_error.is_none());
    controller.dismiss_transaction_error();
    assert_eq!(controller.snapshot(), dismissed);
}

#[tokio::test]
async fn new_submission_clears_previous_error() {
    let (controller, _) = connected(GOERLI).await;
    controller.wallet().script(Script::Revert);

    assert_eq!(controller.submit_deposit(&weth(), "1").await, TxOutcome::Failed);
    assert_eq!(controller.snapshot().transaction_error(), Some("transaction reverted"));

    let outcome = controller.submit_deposit(&weth(), "1").await;
    assert!(matches!(outcome, TxOutcome::Confirmed(_)));
    assert!(controller.snapshot().last_error.is_none());
}

#[tokio::test]
async fn stale_receipt_is_dropped() {
    let (controller, _) = connected(GOERLI).await;
    let release = Arc::new(Notify::new());
    controller.wallet().script(Script::Hold(release.clone()));

    let mut rx = controller.subscribe();
    let task = tokio::spawn({
        let controller = controller.clone();
        async move {
            let key = weth();
            controller.submit_deposit(&key, "1").await
        }
    });
    let pending = wait_for(&mut rx, |session| session.pending_transaction.is_some()).await;

    controller.reset();
    release.notify_one();
    assert_eq!(task.await.unwrap(), TxOutcome::Superseded);

    let session = controller.snapshot();
    assert_eq!(session.generation, pending.generation + 1);
    assert!(session.pending_transaction.is_none());
    assert!(session.token_readings.is_empty());
}

#[tokio::test]
async fn submission_requires_connection() {
    let (controller, _) = setup(GOERLI);
    assert_eq!(controller.submit_deposit(&weth(), "1").await, TxOutcome::Unavailable);
    assert!(controller.snapshot().last_error.is_none());
    assert!(controller.wallet().sent().is_empty());
}

#[tokio::test]
async fn bridge_locks_erc20_tokens() {
    let (controller, chain) = setup(GOERLI);
    let token = token_address(GOERLI, &dummy());
    chain.set_balance(token, ACCOUNT, ether(5));
    controller.connect().await;

    let outcome = controller.submit_bridge(&dummy(), "1", BridgeKind::Erc20).await;
    assert!(matches!(outcome, TxOutcome::Confirmed(_)));

    let bridge = goerli_bridge();
    let sent = controller.wallet().sent();
    assert_eq!(sent[0].to, Some(TxKind::Call(bridge.root_chain_manager)));
    assert!(sent[0].value.is_none());
    let call =
        IRootChainManager::depositForCall::abi_decode(sent[0].input.input().unwrap()).unwrap();
    assert_eq!(call.user, ACCOUNT);
    assert_eq!(call.rootToken, token);
    assert_eq!(U256::abi_decode(&call.depositData).unwrap(), ether(1));

    let reading = controller.snapshot().reading("dummyERC20").cloned().unwrap();
    assert_eq!(reading.balance, Some(ether(4)));
    assert_eq!(reading.allowance_spender, Some(bridge.erc20_predicate));
}

#[tokio::test]
async fn bridge_locks_ether() {
    let (controller, _) = connected(GOERLI).await;
    let outcome = controller.submit_bridge(&weth(), "0.1", BridgeKind::Ether).await;
    assert!(matches!(outcome, TxOutcome::Confirmed(_)));

    let sent = controller.wallet().sent();
    assert_eq!(sent[0].to, Some(TxKind::Call(goerli_bridge().root_chain_manager)));
    assert_eq!(sent[0].value, Some(U256::from(100_000_000_000_000_000u128)));
}

#[tokio::test]
async fn bridge_requires_bridge_contracts() {
    let (controller, _) = connected(3).await;
    let outcome = controller.submit_bridge(&weth(), "1", BridgeKind::Ether).await;
    assert_eq!(outcome, TxOutcome::Failed);
    assert_eq!(
        controller.snapshot().transaction_error(),
        Some("the connected network has no bridge")
    );
    assert!(controller.wallet().sent().is_empty());
}

#[tokio::test]
async fn listeners_registered_once_per_session() {
    let (controller, _) = connected(GOERLI).await;
    assert_eq!(controller.wallet().subscriptions(), 1);

    controller.connect().await;
    assert_eq!(controller.wallet().subscriptions(), 1);
    assert_eq!(controller.wallet().account_requests(), 1);
}

#[tokio::test]
async fn account_switch_reconnects() {
    let (controller, _) = connected(GOERLI).await;
    let generation = controller.snapshot().generation;
    let mut rx = controller.subscribe();

    controller.wallet().switch_account(OTHER);
    let session = wait_for(&mut rx, |session| {
        session.connected_address == Some(OTHER) && session.status == SessionStatus::Connected
    })
    .await;

    assert_eq!(session.generation, generation + 1);
    assert_eq!(controller.wallet().subscriptions(), 2);
    assert_eq!(controller.wallet().account_requests(), 2);
}

#[tokio::test]
async fn account_switch_matches_fresh_connect() {
    let (controller, chain) = connected(GOERLI).await;
    let weth_token = token_address(GOERLI, &weth());
    chain.set_balance(weth_token, ACCOUNT, ether(3));
    chain.set_balance(weth_token, OTHER, ether(1));
    controller.refresh_balance(&weth()).await.unwrap();
    controller.wallet().script(Script::Fail("insufficient funds"));
    assert_eq!(controller.submit_deposit(&weth(), "5").await, TxOutcome::Failed);

    let fresh = SessionController::new(
        MockWallet::new(chain.clone(), OTHER, GOERLI),
        chain.clone(),
        Config::default().networks,
    );
    fresh.connect().await;
    let expected = Session { generation: 0, ..fresh.snapshot() };
    assert_eq!(expected.reading("weth").unwrap().balance, Some(ether(1)));

    let mut rx = controller.subscribe();
    let generation = controller.snapshot().generation;
    controller.wallet().switch_account(OTHER);
    let session = wait_for(&mut rx, |session| {
        Session { generation: 0, ..session.clone() } == expected
    })
    .await;
    assert!(session.generation > generation);
}

#[tokio::test]
async fn network_switch_reloads_address_book() {
    let (controller, _) = connected(GOERLI).await;
    let mut rx = controller.subscribe();

    controller.wallet().switch_network(3);
    let session = wait_for(&mut rx, |session| {
        session.network_id == 3 && session.status == SessionStatus::Connected
    })
    .await;

    let keys: Vec<_> = session.token_readings.keys().map(TokenKey::as_str).collect();
    assert_eq!(keys, ["weth"]);
    assert!(controller.network().unwrap().bridge.is_none());
}
