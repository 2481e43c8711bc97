mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wanyumba_config::{KeyringTokenStore, Settings};
use wanyumba_core::{Console, TokenStore};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions need no console or settings.
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wanyumba", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let console = build_console(&cli.global)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &console, &cli.global).await
        }
    }
}

/// Build a `Console` from settings, env, and CLI overrides.
fn build_console(global: &cli::GlobalOpts) -> Result<Console, CliError> {
    let mut settings = Settings::load()?;

    if let Some(ref url) = global.api_url {
        settings.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        settings.timeout = timeout;
    }

    let config = settings.console_config()?;
    let tokens: Arc<dyn TokenStore> = Arc::new(KeyringTokenStore::new());

    Ok(Console::new(config, tokens)?)
}
