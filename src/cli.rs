//! Command-line interface definition for Helpdesk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions and
//! ticket inspection.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Helpdesk - retrieval-augmented support chatbot
///
/// Answers questions from the knowledge base, creates support tickets
/// and lists existing tickets through conversation.
#[derive(Parser, Debug, Clone)]
#[command(name = "helpdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/helpdesk.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the ticket store directory
    #[arg(long, env = "HELPDESK_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Helpdesk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive support chat
    Chat {
        /// Conversation memory key (defaults to a fresh session)
        #[arg(short, long)]
        session: Option<String>,

        /// Ticket owner (overrides store.username)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question or request
        query: String,

        /// Ticket owner (overrides store.username)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Inspect stored tickets
    Tickets {
        /// Ticket subcommand
        #[command(subcommand)]
        command: TicketCommand,
    },
}

/// Ticket inspection subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TicketCommand {
    /// List every ticket stored for a user
    List {
        /// Ticket owner (overrides store.username)
        #[arg(short, long)]
        user: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/helpdesk.yaml".to_string()),
            verbose: false,
            json_logs: false,
            store_path: None,
            command: Commands::Chat {
                session: None,
                user: None,
            },
        }
    }
}
