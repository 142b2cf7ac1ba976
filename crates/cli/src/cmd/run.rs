use crate::input::{Command, HELP};
use alloy_primitives::Address;
use alloy_provider::ProviderBuilder;
use clap::Parser;
use dapp_config::{Config, NetworkConfig, TokenKey};
use dapp_session::{
    ChainClient, Session, SessionController, TxOutcome, WalletProvider, forms::Form, view::Screen,
};
use dapp_wallets::{BrowserWalletServer, RpcChainClient};
use eyre::{Result, WrapErr};
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use yansi::Paint;

/// CLI arguments for `dapp run`.
#[derive(Clone, Debug, Default, Parser)]
pub struct RunArgs {
    /// Ask the wallet for account access as soon as the bridge is up.
    #[arg(long)]
    pub connect: bool,
}

impl RunArgs {
    pub async fn run(self, config: Config) -> Result<()> {
        let rpc_url: url::Url = config
            .rpc_url
            .parse()
            .wrap_err_with(|| format!("invalid RPC URL `{}`", config.rpc_url))?;
        let client = RpcChainClient::new(ProviderBuilder::new().connect_http(rpc_url));

        let mut server =
            BrowserWalletServer::new(config.port, Duration::from_secs(config.timeout));
        server.start().await.wrap_err("failed to start the wallet bridge")?;
        println!("Open {} in a browser with your wallet installed.", server.url().cyan().bold());
        println!("Type `help` for a list of commands.");

        let config = Arc::new(config);
        let controller = SessionController::new(server.provider(), client, config.networks.clone());
        let render = tokio::spawn(render(controller.subscribe(), Arc::clone(&config)));

        if self.connect {
            dispatch(&controller, Command::Connect);
        }

        let result = read_commands(&controller, &config).await;

        render.abort();
        controller.reset();
        server.stop().await.wrap_err("failed to stop the wallet bridge")?;
        result
    }
}

async fn read_commands<W: WalletProvider, C: ChainClient>(
    controller: &SessionController<W, C>,
    config: &Config,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.wrap_err("failed to read input")?,
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                return Ok(());
            }
        };
        let Some(line) = line else { return Ok(()) };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{}", err.red());
                continue;
            }
        };
        match command {
            Command::Quit => return Ok(()),
            Command::Help => println!("{HELP}"),
            Command::Status => {
                let session = controller.snapshot();
                print_screen(&session, config.network(session.network_id));
            }
            command => dispatch(controller, command),
        }
    }
}

/// Hands a command to the controller without blocking the input loop.
fn dispatch<W: WalletProvider, C: ChainClient>(
    controller: &SessionController<W, C>,
    command: Command,
) {
    let usage = command.usage();
    let controller = controller.clone();
    let submitted = match command {
        Command::Connect => {
            tokio::spawn(async move { controller.connect().await });
            true
        }
        Command::Deposit { token, form } => form.submit(|amount| {
            tokio::spawn(async move {
                report(controller.submit_deposit(&token, &amount).await);
            });
        }),
        Command::Approve { token, form } => form.submit(|(spender, amount)| {
            let Some(spender) = parse_spender(&spender) else { return };
            tokio::spawn(async move {
                report(controller.submit_approve(&token, spender, &amount).await);
            });
        }),
        Command::Allowance { token, form } => form.submit(|spender| {
            let Some(spender) = parse_spender(&spender) else { return };
            tokio::spawn(async move {
                match controller.refresh_allowance(&token, spender).await {
                    Ok(allowance) => println!("allowance of {spender}: {allowance}"),
                    Err(err) => eprintln!("{}", err.red()),
                }
            });
        }),
        Command::Bridge { token, form, kind } => form.submit(|amount| {
            tokio::spawn(async move {
                report(controller.submit_bridge(&token, &amount, kind).await);
            });
        }),
        Command::Refresh => {
            tokio::spawn(async move { refresh(&controller).await });
            true
        }
        Command::Dismiss => {
            controller.dismiss_transaction_error();
            controller.dismiss_network_error();
            true
        }
        Command::Status | Command::Help | Command::Quit => true,
    };

    if !submitted && let Some(usage) = usage {
        eprintln!("{} usage: {usage}", "missing fields,".yellow());
    }
}

/// Re-reads every balance and the allowance of every configured spender.
async fn refresh<W: WalletProvider, C: ChainClient>(controller: &SessionController<W, C>) {
    let tokens: Vec<(TokenKey, Option<Address>)> = controller
        .network()
        .map(|network| {
            network.tokens.iter().map(|token| (token.key.clone(), token.spender)).collect()
        })
        .unwrap_or_default();
    if tokens.is_empty() {
        eprintln!("{}", "nothing to refresh".yellow());
        return;
    }

    let reads = tokens.iter().map(|(key, spender)| async move {
        if let Err(err) = controller.refresh_balance(key).await {
            eprintln!("{}", format!("{key}: {err}").red());
        }
        if let Some(spender) = *spender
            && let Err(err) = controller.refresh_allowance(key, spender).await
        {
            eprintln!("{}", format!("{key}: {err}").red());
        }
    });
    futures::future::join_all(reads).await;
}

fn parse_spender(spender: &str) -> Option<Address> {
    match spender.parse() {
        Ok(spender) => Some(spender),
        Err(err) => {
            eprintln!("{}", format!("invalid spender `{spender}`: {err}").red());
            None
        }
    }
}

/// Prints what the session does not show by itself.
fn report(outcome: TxOutcome) {
    match outcome {
        TxOutcome::Confirmed(hash) => println!("{}", format!("transaction {hash} mined").green()),
        TxOutcome::Rejected => println!("{}", "transaction cancelled in the wallet".dim()),
        TxOutcome::Superseded => {
            println!("{}", "the session changed before the transaction settled".dim())
        }
        TxOutcome::Unavailable => eprintln!("{}", "connect a wallet first".yellow()),
        // The error is part of the session and rendered with it.
        TxOutcome::Failed => {}
    }
}

/// Re-renders the screen on every session change.
async fn render(mut session: watch::Receiver<Session>, config: Arc<Config>) {
    while session.changed().await.is_ok() {
        let snapshot = session.borrow_and_update().clone();
        print_screen(&snapshot, config.network(snapshot.network_id));
    }
}

fn print_screen(session: &Session, network: Option<&NetworkConfig>) {
    let screen = Screen::new(session, network);
    println!();
    if screen.gate().is_some() {
        println!("{}", screen.yellow());
    } else if session.last_error.is_some() {
        println!("{}", screen.red());
    } else {
        println!("{screen}");
    }
}
