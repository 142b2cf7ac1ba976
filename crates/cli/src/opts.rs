use crate::cmd::{networks::NetworksArgs, run::RunArgs};
use clap::{Parser, Subcommand};
use dapp_config::{
    Config,
    figment::{
        self, Metadata, Profile, Provider,
        providers::Serialized,
        value::{Dict, Map},
    },
};
use serde::Serialize;
use std::path::PathBuf;

/// Bridge dapp: wrap, approve and bridge tokens through a browser wallet.
#[derive(Clone, Debug, Parser)]
#[command(name = "dapp", version, about)]
pub struct Dapp {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub cmd: Option<DappSubcommand>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum DappSubcommand {
    /// Start the wallet bridge and the interactive session (default).
    Run(RunArgs),
    /// Print the configured networks, tokens and bridge contracts.
    #[command(visible_alias = "n")]
    Networks(NetworksArgs),
}

/// Command line overrides of the configuration.
#[derive(Clone, Debug, Default, Serialize, Parser)]
pub struct ConfigArgs {
    /// Path to the config file.
    ///
    /// Defaults to `dapp.toml` in the current directory.
    #[arg(long, short, global = true, value_name = "PATH")]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// The JSON-RPC endpoint used for balance and allowance reads.
    #[arg(long, global = true, value_name = "URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Port of the wallet bridge page, 0 for any free port.
    #[arg(long, short, global = true, value_name = "PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Seconds to wait for the browser wallet to answer.
    #[arg(long, global = true, value_name = "SECS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Provider for ConfigArgs {
    fn metadata(&self) -> Metadata {
        Metadata::named("command line arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}

impl ConfigArgs {
    /// Loads the config with these arguments merged over the file and the environment.
    pub fn load_config(&self) -> eyre::Result<Config> {
        if let Some(path) = &self.config {
            eyre::ensure!(path.is_file(), "config file `{}` does not exist", path.display());
        }
        let figment = Config::figment(self.config.as_ref()).merge(self);
        Ok(Config::from_provider(figment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Dapp::command().debug_assert();
    }

    #[test]
    fn defaults_to_run() {
        let args = Dapp::parse_from(["dapp"]);
        assert!(args.cmd.is_none());

        let args = Dapp::parse_from(["dapp", "networks", "--port", "8080", "--chain", "5"]);
        assert!(matches!(
            args.cmd,
            Some(DappSubcommand::Networks(NetworksArgs { chain: Some(5) }))
        ));
        assert_eq!(args.config.port, Some(8080));
    }

    #[test]
    fn args_override_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(Config::FILE_NAME, "port = 8080\ntimeout = 10")?;
            jail.set_env("DAPP_RPC_URL", "http://node:8545");
            jail.set_env("DAPP_TIMEOUT", "20");

            let args = Dapp::parse_from(["dapp", "--timeout", "30"]);
            let config = args.config.load_config().map_err(|err| err.to_string())?;
            assert_eq!(config.port, 8080);
            assert_eq!(config.rpc_url, "http://node:8545");
            assert_eq!(config.timeout, 30);
            similar_asserts::assert_eq!(config.networks, Config::default().networks);
            Ok(())
        });
    }

    #[test]
    fn missing_config_file_is_an_error() {
        Jail::expect_with(|_| {
            let args = Dapp::parse_from(["dapp", "--config", "missing.toml"]);
            let err = args.config.load_config().unwrap_err();
            assert!(err.to_string().contains("missing.toml"), "{err}");
            Ok(())
        });
    }
}
