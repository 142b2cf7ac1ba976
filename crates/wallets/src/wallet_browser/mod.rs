//! Wallet bridge to a browser extension.
//!
//! A local HTTP server serves a page that talks to the injected EIP-1193 wallet
//! (`window.ethereum`) and relays account access, chain identity, change notifications and
//! transactions through a small JSON API.

pub mod error;
pub mod provider;
pub mod server;
pub mod types;

mod app;
mod handlers;
mod queue;
mod router;
mod state;
