//! Built-in address book.

use crate::{BridgeConfig, NetworkConfig, TokenConfig};
use alloy_primitives::{Address, address};

const LEGACY_TESTNET_WETH: Address = address!("0xc778417E063141139Fce010982780140Aa0cD5Ab");
const GOERLI_WETH: Address = address!("0xA6FA4fB5f76172d178d61B04b0ecd319C5d1C0aa");
const GOERLI_DUMMY_ERC20: Address = address!("0x655F2166b0709cd575202630952D71E2bB0d61Af");
const GOERLI_ROOT_CHAIN_MANAGER: Address = address!("0xBbD7cBFA79faee899Eaf900F13C9065bF03B1A74");
const GOERLI_ERC20_PREDICATE: Address = address!("0xdD6596F2029e6233DEFfaCa316e6A95217d4Dc34");

pub(crate) fn networks() -> Vec<NetworkConfig> {
    let goerli_bridge = BridgeConfig {
        root_chain_manager: GOERLI_ROOT_CHAIN_MANAGER,
        erc20_predicate: GOERLI_ERC20_PREDICATE,
    };

    vec![
        NetworkConfig {
            chain_id: 3,
            name: Some("ropsten".to_string()),
            tokens: vec![TokenConfig::new("weth", LEGACY_TESTNET_WETH).wrapped_native()],
            bridge: None,
        },
        NetworkConfig {
            chain_id: 4,
            name: Some("rinkeby".to_string()),
            tokens: vec![TokenConfig::new("weth", LEGACY_TESTNET_WETH).wrapped_native()],
            bridge: None,
        },
        NetworkConfig {
            chain_id: 5,
            name: Some("goerli".to_string()),
            tokens: vec![
                TokenConfig::new("weth", GOERLI_WETH).wrapped_native(),
                TokenConfig::new("dummyERC20", GOERLI_DUMMY_ERC20)
                    .with_spender(goerli_bridge.erc20_predicate),
            ],
            bridge: Some(goerli_bridge),
        },
    ]
}
