//! # dapp-wallets
//!
//! Concrete capabilities for the bridge dapp session: a browser wallet bridge implementing
//! [`WalletProvider`](dapp_session::WalletProvider) and a JSON-RPC [`RpcChainClient`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod wallet_browser;
pub use wallet_browser::{
    error::BrowserWalletError, provider::BrowserWalletProvider, server::BrowserWalletServer,
};

mod rpc;
pub use rpc::RpcChainClient;
