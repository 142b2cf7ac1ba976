use clap::Parser;
use dapp_cli::{
    handler,
    opts::{Dapp, DappSubcommand},
    utils,
};
use eyre::Result;

fn main() -> Result<()> {
    handler::install();
    utils::subscriber();
    utils::enable_paint();
    let args = Dapp::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Dapp) -> Result<()> {
    let config = args.config.load_config()?;
    match args.cmd.unwrap_or_else(|| DappSubcommand::Run(Default::default())) {
        DappSubcommand::Run(cmd) => cmd.run(config).await,
        DappSubcommand::Networks(cmd) => cmd.run(&config),
    }
}
