//! Helpdesk - retrieval-augmented support chatbot CLI
//!
#![doc = "Helpdesk - retrieval-augmented support chatbot CLI"]
#![doc = "Main entry point for the Helpdesk application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use helpdesk::cli::{Cli, Commands, TicketCommand};
use helpdesk::commands;
use helpdesk::config::Config;
use helpdesk::storage::TicketStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/helpdesk.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // The store is opened once up front; a connection failure ends the process
    let store = commands::open_store(&config).map_err(|e| {
        tracing::error!("Ticket store unavailable: {:#}", e);
        e
    })?;

    let result = match cli.command {
        Commands::Chat { session, user } => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(config, store.clone(), session, user).await
        }
        Commands::Ask { query, user } => {
            tracing::debug!("Answering single query");
            commands::ask::run_ask(config, store.clone(), query, user).await
        }
        Commands::Tickets { command } => match command {
            TicketCommand::List { user, json } => {
                let username = user.unwrap_or_else(|| config.store.username.clone());
                commands::tickets::list_tickets(&store, &username, json).await
            }
        },
    };

    if let Err(e) = store.flush().await {
        tracing::warn!("Failed to flush ticket store on shutdown: {:#}", e);
    }

    result
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_directive = if verbose { "helpdesk=debug" } else { "helpdesk=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
