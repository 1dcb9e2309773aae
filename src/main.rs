use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;

mod domain;
mod application;
mod infrastructure;

use application::errors::BotError;
use application::messaging::MessageRouter;
use application::services::{ConnectionSupervisor, SupervisorExit};
use domain::entities::Jid;
use infrastructure::adapters::{ConsoleFactory, ConsoleInput, ConsolePrompt};
use infrastructure::config::Config;
use infrastructure::logging;
use infrastructure::storage::FileCredentialStore;

#[derive(Parser)]
#[command(name = "kickall-bot")]
#[command(about = "Group moderation bot with a self-healing session", long_about = None)]
struct Cli {
    /// Config file path (ignored if missing)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Credential directory (overrides config)
    #[arg(long)]
    auth_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();

    let config = match load_config(&cli.config, cli.auth_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(run_bot(config))
}

/// Message handlers share one thread with the connection loop
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}

fn load_config(path: &Path, auth_dir: Option<PathBuf>) -> Result<Config, BotError> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        Config::default()
    };
    config.apply_env();

    if let Some(dir) = auth_dir {
        config.bot.auth_dir = dir;
    }

    Ok(config)
}

async fn run_bot(config: Config) -> ExitCode {
    tracing::info!("Starting {} (credentials in {})", config.bot.name, config.bot.auth_dir.display());

    let input = ConsoleInput::stdin();

    let mut factory = ConsoleFactory::new(input.clone(), config.adapters.console.protocol_version);
    for (group, members) in &config.adapters.console.groups {
        factory = factory.with_group(Jid::new(group), members.iter().map(Jid::new));
    }

    let router = MessageRouter::new().with_failure_notice(config.moderation.notify_on_failure);

    let (stop, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, shutting down");
            let _ = stop.send(true);
        }
    });

    let mut supervisor = ConnectionSupervisor::new(
        Arc::new(factory),
        Arc::new(FileCredentialStore::new(&config.bot.auth_dir)),
        Arc::new(ConsolePrompt::new(input)),
        router,
        config.supervisor_options(),
    )
    .with_shutdown(shutdown);

    match supervisor.run().await {
        Ok(SupervisorExit::Shutdown) => ExitCode::SUCCESS,
        Ok(SupervisorExit::LoggedOut) => {
            tracing::error!(
                "Session was logged out. Remove {} and restart to pair again.",
                config.bot.auth_dir.display()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Failed to start bot: {}", e);
            ExitCode::FAILURE
        }
    }
}
