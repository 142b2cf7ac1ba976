use clap::Parser;
use dapp_config::{Config, NetworkConfig};
use eyre::Result;
use std::fmt::Write;

/// CLI arguments for `dapp networks`.
#[derive(Clone, Debug, Default, Parser)]
pub struct NetworksArgs {
    /// Only print the network with this chain id.
    #[arg(long, value_name = "CHAIN_ID")]
    pub chain: Option<u64>,
}

impl NetworksArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let networks = match self.chain {
            Some(chain_id) => {
                let network = config
                    .network(chain_id)
                    .ok_or_else(|| eyre::eyre!("chain {chain_id} is not configured"))?;
                std::slice::from_ref(network)
            }
            None => config.networks.as_slice(),
        };
        println!("{}", format_networks(networks));
        Ok(())
    }
}

/// Renders the address book, one block per network.
pub fn format_networks(networks: &[NetworkConfig]) -> String {
    let mut out = String::new();
    for (i, network) in networks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{} (chain {})", network.display_name(), network.chain_id);
        for token in &network.tokens {
            let key = token.key.as_str();
            let _ = write!(out, "  {key:<12} {} decimals={}", token.address, token.decimals);
            if token.wrapped_native {
                out.push_str(" wrapped");
            }
            if let Some(spender) = token.spender {
                let _ = write!(out, " spender={spender}");
            }
            out.push('\n');
        }
        if let Some(bridge) = network.bridge {
            let _ = writeln!(out, "  bridge       {}", bridge.root_chain_manager);
            let _ = writeln!(out, "  predicate    {}", bridge.erc20_predicate);
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use dapp_config::{BridgeConfig, TokenConfig};

    #[test]
    fn formats_address_book() {
        let weth = address!("0xb4fbf271143f4fbf7b91a5ded31805e42b2208d6");
        let usdc = address!("0x07865c6e87b9f70255377e024ace6630c1eaa37f");
        let manager = address!("0xbbd7cbfa79faee899eaf900f13c9065bf03b1a74");
        let predicate = address!("0x37c3bfc05d5ebf9ebb3ff80ce0bd0133bf221bc8");
        let networks = [
            NetworkConfig {
                chain_id: 5,
                name: Some("goerli".to_string()),
                tokens: vec![
                    TokenConfig::new("weth", weth).wrapped_native(),
                    TokenConfig::new("usdc", usdc).with_decimals(6).with_spender(predicate),
                ],
                bridge: Some(BridgeConfig {
                    root_chain_manager: manager,
                    erc20_predicate: predicate,
                }),
            },
            NetworkConfig { chain_id: 1337, name: None, tokens: Vec::new(), bridge: None },
        ];

        let expected = format!(
            "\
goerli (chain 5)
  weth         {weth} decimals=18 wrapped
  usdc         {usdc} decimals=6 spender={predicate}
  bridge       {manager}
  predicate    {predicate}

1337 (chain 1337)"
        );
        similar_asserts::assert_eq!(format_networks(&networks), expected);
    }

    #[test]
    fn unknown_chain_is_an_error() {
        let args = NetworksArgs { chain: Some(424242) };
        let err = args.run(&Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "chain 424242 is not configured");
    }
}
