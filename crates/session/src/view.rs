//! Presentation of a session snapshot.
//!
//! Views only borrow a [`Session`]; they never change it. Dismiss and connect actions are
//! advertised through [`Action`] and performed by whoever renders the view.

use crate::{Session, SessionStatus, TokenReading, units::format_smallest_unit};
use alloy_primitives::{Address, TxHash, U256};
use dapp_config::{NetworkConfig, TokenConfig, TokenKey};
use std::fmt;

/// A user action offered next to a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Connect,
    DismissNetworkError,
    DismissTransactionError,
    Deposit,
    Approve,
    Allowance,
    BridgeErc20,
    BridgeEther,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::DismissNetworkError | Self::DismissTransactionError => "dismiss",
            Self::Deposit => "deposit",
            Self::Approve => "approve",
            Self::Allowance => "allowance",
            Self::BridgeErc20 => "bridge erc20",
            Self::BridgeEther => "bridge ether",
        }
    }
}

/// Shown while no account is connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletGate<'a> {
    /// No wallet is installed.
    NoWallet,
    /// A wallet exists but no account is connected yet.
    Connect { connecting: bool, error: Option<&'a str> },
}

impl<'a> WalletGate<'a> {
    /// Returns the gate for `session`, `None` once it is connected.
    pub fn for_session(session: &'a Session) -> Option<Self> {
        match session.status {
            SessionStatus::Connected => None,
            SessionStatus::NoWallet => Some(Self::NoWallet),
            SessionStatus::Connecting => {
                Some(Self::Connect { connecting: true, error: session.network_error() })
            }
            SessionStatus::Disconnected => {
                Some(Self::Connect { connecting: false, error: session.network_error() })
            }
        }
    }

    pub fn actions(&self) -> Vec<Action> {
        match self {
            Self::NoWallet => Vec::new(),
            Self::Connect { connecting, error } => {
                let mut actions = Vec::new();
                if !connecting {
                    actions.push(Action::Connect);
                }
                if error.is_some() {
                    actions.push(Action::DismissNetworkError);
                }
                actions
            }
        }
    }
}

impl fmt::Display for WalletGate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWallet => write!(
                f,
                "No Ethereum wallet was detected.\n\
                 Please install MetaMask or another EIP-1193 wallet in your browser and reload it."
            ),
            Self::Connect { connecting, error } => {
                if *connecting {
                    write!(f, "Waiting for the wallet to connect...")?;
                } else {
                    write!(f, "Please connect to your wallet.")?;
                }
                if let Some(error) = error {
                    write!(f, "\nError: {error}")?;
                }
                Ok(())
            }
        }
    }
}

/// Transaction banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionNotice<'a> {
    Pending(TxHash),
    Error(&'a str),
}

impl<'a> TransactionNotice<'a> {
    /// Returns the banners of `session`, pending first.
    pub fn for_session(session: &'a Session) -> Vec<Self> {
        let pending = session.pending_transaction.map(Self::Pending);
        let error = session.transaction_error().map(Self::Error);
        pending.into_iter().chain(error).collect()
    }

    pub fn is_dismissible(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for TransactionNotice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(hash) => write!(f, "Waiting for transaction {hash} to be mined"),
            Self::Error(message) => write!(f, "Error sending transaction: {message}"),
        }
    }
}

/// One token panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenSection<'a> {
    pub token: &'a TokenConfig,
    pub reading: Option<&'a TokenReading>,
    pub actions: Vec<Action>,
}

/// The bridge panel of a network with bridge contracts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeSection {
    pub root_chain_manager: Address,
    /// Tokens that can be locked through the ERC-20 predicate.
    pub tokens: Vec<TokenKey>,
    pub actions: Vec<Action>,
}

/// Everything shown for a session.
#[derive(Clone, Copy, Debug)]
pub struct Screen<'a> {
    session: &'a Session,
    network: Option<&'a NetworkConfig>,
}

impl<'a> Screen<'a> {
    /// `network` is the address book entry of the session's network.
    pub fn new(session: &'a Session, network: Option<&'a NetworkConfig>) -> Self {
        Self { session, network }
    }

    pub fn gate(&self) -> Option<WalletGate<'a>> {
        WalletGate::for_session(self.session)
    }

    pub fn notices(&self) -> Vec<TransactionNotice<'a>> {
        TransactionNotice::for_session(self.session)
    }

    /// Token panels, only for tokens configured on the connected network.
    pub fn token_sections(&self) -> Vec<TokenSection<'a>> {
        if !self.session.is_connected() {
            return Vec::new();
        }
        let Some(network) = self.network else { return Vec::new() };
        network
            .tokens
            .iter()
            .map(|token| {
                let mut actions = Vec::new();
                if token.wrapped_native {
                    actions.push(Action::Deposit);
                }
                actions.extend([Action::Approve, Action::Allowance]);
                TokenSection {
                    token,
                    reading: self.session.token_readings.get(&token.key),
                    actions,
                }
            })
            .collect()
    }

    pub fn bridge_section(&self) -> Option<BridgeSection> {
        if !self.session.is_connected() {
            return None;
        }
        let network = self.network?;
        let bridge = network.bridge?;
        let tokens: Vec<_> = network
            .tokens
            .iter()
            .filter(|token| token.spender == Some(bridge.erc20_predicate))
            .map(|token| token.key.clone())
            .collect();
        let mut actions = Vec::new();
        if !tokens.is_empty() {
            actions.push(Action::BridgeErc20);
        }
        actions.push(Action::BridgeEther);
        Some(BridgeSection { root_chain_manager: bridge.root_chain_manager, tokens, actions })
    }
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(gate) = self.gate() {
            return write!(f, "{gate}");
        }

        for notice in self.notices() {
            writeln!(f, "{notice}")?;
        }
        if let Some(address) = self.session.connected_address {
            writeln!(f, "address: {address}")?;
        }
        let network = self
            .network
            .map(NetworkConfig::display_name)
            .unwrap_or_else(|| format!("{} (unsupported)", self.session.network_id));
        write!(f, "network: {network}")?;

        for section in self.token_sections() {
            let decimals = section.token.decimals;
            let reading = section.reading.cloned().unwrap_or_default();
            write!(f, "\n\n[{}] {}", section.token.key, section.token.address)?;
            write!(f, "\n  balance:   {}", amount(reading.balance, decimals))?;
            write!(f, "\n  allowance: {}", amount(reading.allowance, decimals))?;
            if let Some(spender) = reading.allowance_spender {
                write!(f, " (spender {spender})")?;
            }
            write!(f, "\n  actions:   {}", labels(&section.actions))?;
        }

        if let Some(bridge) = self.bridge_section() {
            write!(f, "\n\n[bridge] {}", bridge.root_chain_manager)?;
            if !bridge.tokens.is_empty() {
                let tokens: Vec<_> = bridge.tokens.iter().map(TokenKey::as_str).collect();
                write!(f, "\n  tokens:    {}", tokens.join(", "))?;
            }
            write!(f, "\n  actions:   {}", labels(&bridge.actions))?;
        }
        Ok(())
    }
}

fn amount(value: Option<U256>, decimals: u8) -> String {
    match value {
        Some(value) => format!("{value} ({})", format_smallest_unit(value, decimals)),
        None => "-".to_string(),
    }
}

fn labels(actions: &[Action]) -> String {
    actions.iter().map(Action::label).collect::<Vec<_>>().join(", ")
}
