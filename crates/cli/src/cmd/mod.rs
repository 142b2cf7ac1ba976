//! `dapp` subcommands.

pub mod networks;
pub mod run;
