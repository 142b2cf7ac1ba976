//! Parsing of interactive input lines.
//!
//! Every line names a command and fills its form positionally. Missing form fields are left
//! empty here; the form collector rejects them before anything reaches the session.

use dapp_session::{
    BridgeKind, TokenKey,
    forms::{AllowanceForm, ApproveForm, DepositForm},
};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  connect                                 connect the browser wallet
  deposit <token> <amount>                wrap native currency into <token>
  approve <token> <spender> <amount>      approve <spender> to move <amount> of <token>
  allowance <token> <spender>             read the allowance of <spender>
  bridge <token> <amount> [erc20|ether]   deposit into the bridge of the current network
  refresh                                 re-read balances and allowances
  dismiss                                 dismiss the current error
  status                                  show the session
  help                                    show this message
  quit                                    stop the bridge and exit";

/// A parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Connect,
    Deposit { token: TokenKey, form: DepositForm },
    Approve { token: TokenKey, form: ApproveForm },
    Allowance { token: TokenKey, form: AllowanceForm },
    Bridge { token: TokenKey, form: DepositForm, kind: BridgeKind },
    Refresh,
    Dismiss,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Usage line of commands that take arguments.
    pub fn usage(&self) -> Option<&'static str> {
        match self {
            Self::Deposit { .. } => Some("deposit <token> <amount>"),
            Self::Approve { .. } => Some("approve <token> <spender> <amount>"),
            Self::Allowance { .. } => Some("allowance <token> <spender>"),
            Self::Bridge { .. } => Some("bridge <token> <amount> [erc20|ether]"),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command `{0}`, type `help` for a list of commands")]
    Unknown(String),
    #[error("`{0}` needs a token key")]
    MissingToken(&'static str),
    #[error("unknown bridge kind `{0}`, expected `erc20` or `ether`")]
    BridgeKind(String),
    #[error("unexpected argument `{0}`")]
    Unexpected(String),
}

impl FromStr for Command {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or("status");
        let mut field = || words.next().map(String::from);

        let command = match name {
            "connect" => Self::Connect,
            "deposit" => {
                let token = token(field(), "deposit")?;
                Self::Deposit { token, form: DepositForm { amount: field() } }
            }
            "approve" => {
                let token = token(field(), "approve")?;
                Self::Approve { token, form: ApproveForm { spender: field(), amount: field() } }
            }
            "allowance" => {
                let token = token(field(), "allowance")?;
                Self::Allowance { token, form: AllowanceForm { spender: field() } }
            }
            "bridge" => {
                let token = token(field(), "bridge")?;
                let form = DepositForm { amount: field() };
                let kind = match field().as_deref() {
                    None | Some("erc20") => BridgeKind::Erc20,
                    Some("ether") => BridgeKind::Ether,
                    Some(other) => return Err(InputError::BridgeKind(other.to_string())),
                };
                Self::Bridge { token, form, kind }
            }
            "refresh" => Self::Refresh,
            "dismiss" => Self::Dismiss,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(InputError::Unknown(other.to_string())),
        };

        match words.next() {
            Some(extra) => Err(InputError::Unexpected(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn token(word: Option<String>, command: &'static str) -> Result<TokenKey, InputError> {
    word.map(TokenKey::from).ok_or(InputError::MissingToken(command))
}
