use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use user_console::{
    config::Config,
    domain::repositories::UserStore,
    infrastructure::{http::users::HttpUserStore, repositories::in_memory::InMemoryUserStore},
    presentation::console::{
        commands::{Command, Console},
        view::describe_error,
    },
};

#[derive(Parser)]
#[command(name = "user-console", about = "Manage user records kept by a REST service")]
struct Cli {
    #[arg(long, help = "Base URL of the user service (overrides USERS_API_URL)")]
    api_url: Option<String>,

    #[arg(long, help = "Use a throwaway in-memory store instead of the service")]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::try_parse().map_err(|e| anyhow!(e))?;

    let store: Arc<dyn UserStore> = if cli.offline {
        info!("using in-memory user store");
        Arc::new(InMemoryUserStore::new())
    } else {
        let api_url = cli.api_url.unwrap_or(config.api_url);
        info!("using user service at {api_url}");
        Arc::new(
            HttpUserStore::new(&api_url, &config.user_agent, config.timeout)
                .map_err(|e| anyhow!(describe_error(&e)))?,
        )
    };

    let mut console = Console::new(store);
    let output = console
        .run(cli.command)
        .await
        .map_err(|e| anyhow!(describe_error(&e)))?;
    println!("{output}");
    Ok(())
}
