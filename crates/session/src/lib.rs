//! # dapp-session
//!
//! Wallet session state and transaction lifecycle of the bridge dapp.
//!
//! A [`SessionController`] connects to a [`WalletProvider`], reads token balances and allowances
//! through a [`ChainClient`] and tracks the transactions it submits. Its state is published as
//! [`Session`] snapshots that the [`view`] module renders.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod contracts;
pub mod forms;
pub mod units;
pub mod view;

mod controller;
pub use controller::{BridgeKind, SessionController, TxOutcome};

mod error;
pub use error::{AmountError, ProviderError, ReadError, RpcError, USER_REJECTED_CODE};

mod listener;

mod provider;
pub use provider::{ChainClient, TxEvent, TxEventSender, TxEvents, TxReceipt, WalletProvider};

mod session;
pub use session::{Session, SessionError, SessionStatus, TokenReading};

pub use dapp_config::TokenKey;

#[cfg(test)]
mod mock;
