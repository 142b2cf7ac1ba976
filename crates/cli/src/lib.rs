//! # dapp-cli
//!
//! Command line front end of the bridge dapp.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod cmd;
pub mod handler;
pub mod input;
pub mod opts;
pub mod utils;
