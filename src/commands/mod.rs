/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`:    Interactive support chat
- `ask`:     Answer a single query and exit
- `tickets`: Inspect stored tickets

Every handler builds its collaborators from configuration and shares one
ticket store opened by the entrypoint.
*/

use crate::config::Config;
use crate::error::Result;
use crate::providers::create_provider;
use crate::retrieval::create_retriever;
use crate::router::ConversationRouter;
use crate::storage::SledTicketStore;
use std::sync::Arc;

// Special commands parser for chat mode
pub mod special_commands;

// Ticket listing
pub mod tickets;

/// Open the ticket store named by configuration
///
/// Falls back to the platform data directory when `store.path` is unset.
///
/// # Errors
///
/// Returns `HelpdeskError::StoreConnection` if the store cannot be opened
pub fn open_store(config: &Config) -> Result<SledTicketStore> {
    let path = match &config.store.path {
        Some(path) => path.clone(),
        None => SledTicketStore::default_path()?,
    };
    SledTicketStore::open(path)
}

/// Build a router from configuration over an already open store
///
/// # Errors
///
/// Returns error if the provider or retriever cannot be created
pub fn build_router(config: Config, store: SledTicketStore) -> Result<ConversationRouter> {
    let provider = create_provider(&config.provider)?;
    let retriever = create_retriever(&config.retriever)?;
    tracing::debug!(
        provider = %provider.name(),
        top_k = config.retriever.top_k,
        "Router collaborators ready"
    );
    Ok(ConversationRouter::new(
        provider,
        retriever,
        Arc::new(store),
        config,
    ))
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop that routes each line through the
    //! `ConversationRouter`. Lines starting with `/` are handled locally.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::router::{failure_message, TicketOutcome};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use ulid::Ulid;

    /// Start an interactive support chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `store` - Open ticket store
    /// * `session` - Conversation memory key; a new one is generated if absent
    /// * `user` - Ticket owner; defaults to `store.username`
    pub async fn run_chat(
        config: Config,
        store: SledTicketStore,
        session: Option<String>,
        user: Option<String>,
    ) -> Result<()> {
        let session = session.unwrap_or_else(|| Ulid::new().to_string());
        let username = user.unwrap_or_else(|| config.store.username.clone());
        tracing::info!(session = %session, user = %username, "Starting chat session");

        let router = build_router(config, store.clone())?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&session, &username);

        loop {
            let prompt = format!("{} ", "you>".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Tickets) => {
                            if let Err(e) = tickets::list_tickets(&store, &username, false).await {
                                eprintln!("{}", format!("Could not list tickets: {:#}", e).red());
                            }
                            continue;
                        }
                        Ok(SpecialCommand::Memory) => {
                            let used = router.memory().token_count(&session);
                            let limit = router.memory().token_limit();
                            println!(
                                "Memory: {} / {} tokens ({} turns)",
                                used,
                                limit,
                                router.memory().history(&session).len()
                            );
                            continue;
                        }
                        Ok(SpecialCommand::Clear) => {
                            router.memory().clear(&session);
                            println!("{}", "Conversation memory cleared.".yellow());
                            continue;
                        }
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    let purged = router.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, "Expired sessions purged");
                    }

                    match router.route(&session, &username, trimmed).await {
                        Ok(outcome) => {
                            println!("\n{}\n", outcome.response);
                            print_ticket_outcome(&outcome.ticket);
                        }
                        Err(e) => {
                            println!("\n{}\n", failure_message(&e).red());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_ticket_outcome(outcome: &TicketOutcome) {
        match outcome {
            TicketOutcome::Persisted(ticket) => {
                println!("{}", format!("Ticket {} saved.", ticket.ticket_id).green());
            }
            TicketOutcome::StoreFailed { ticket, .. } => {
                println!(
                    "{}",
                    format!(
                        "Warning: ticket {} could not be saved. Please try again later.",
                        ticket.ticket_id
                    )
                    .yellow()
                );
            }
            TicketOutcome::WriteUnconfirmed { ticket, .. } => {
                println!(
                    "{}",
                    format!(
                        "Ticket {} is still being saved. Check /tickets before filing it again.",
                        ticket.ticket_id
                    )
                    .yellow()
                );
            }
            TicketOutcome::Malformed { .. } | TicketOutcome::NotApplicable => {}
        }
    }

    fn print_welcome_banner(session: &str, username: &str) {
        println!("{}", "Helpdesk support chat".cyan().bold());
        println!("Session: {}  User: {}", session.cyan(), username.cyan());
        println!("Type /help for commands, /exit to leave.\n");
    }
}

// One-shot query handler
pub mod ask {
    //! Answer one query and print the response.

    use super::*;
    use crate::router::TicketOutcome;

    /// Route a single query and print the result
    ///
    /// Uses the configured default session, so memory does not carry over
    /// between invocations.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `store` - Open ticket store
    /// * `query` - User text
    /// * `user` - Ticket owner; defaults to `store.username`
    pub async fn run_ask(
        config: Config,
        store: SledTicketStore,
        query: String,
        user: Option<String>,
    ) -> Result<()> {
        let session = config.memory.session_key.clone();
        let username = user.unwrap_or_else(|| config.store.username.clone());
        let router = build_router(config, store)?;

        match router.route(&session, &username, &query).await {
            Ok(outcome) => {
                println!("{}", outcome.response);
                match &outcome.ticket {
                    TicketOutcome::StoreFailed { ticket, error } => {
                        eprintln!("warning: ticket {} was not saved: {}", ticket.ticket_id, error);
                    }
                    TicketOutcome::WriteUnconfirmed { ticket, seconds } => {
                        eprintln!(
                            "warning: ticket {} was not confirmed within {} seconds; check `helpdesk tickets list` before retrying",
                            ticket.ticket_id, seconds
                        );
                    }
                    _ => {}
                }
            }
            Err(e) => println!("{}", crate::router::failure_message(&e)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_config;

    #[test]
    fn test_open_store_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.store.path = Some(dir.path().join("tickets"));
        assert!(open_store(&config).is_ok());
        assert!(dir.path().join("tickets").exists());
    }

    #[test]
    fn test_build_router_with_ollama_and_no_retriever() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.provider.provider_type = "ollama".to_string();
        config.retriever.endpoint = None;
        let store = SledTicketStore::open(dir.path().join("tickets")).unwrap();
        let router = build_router(config, store).unwrap();
        assert_eq!(router.memory().session_count(), 0);
    }

    #[test]
    fn test_build_router_rejects_unknown_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.provider.provider_type = "mystery".to_string();
        let store = SledTicketStore::open(dir.path().join("tickets")).unwrap();
        assert!(build_router(config, store).is_err());
    }
}
