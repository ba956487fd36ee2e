//! Helpdesk - retrieval-augmented support chatbot library
//!
//! This library provides the core functionality of the Helpdesk bot:
//! intent classification, knowledge-base retrieval, ticket creation and
//! listing, and bounded per-session conversation memory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `router`: Classifies each query and dispatches it to a response strategy
//! - `classifier`: Intent labels and the completion-backed classifier
//! - `tickets`: Ticket model and the parser for generated ticket text
//! - `storage`: Per-user ticket collections in an embedded database
//! - `memory`: Token-bounded conversation memory keyed by session
//! - `retrieval`: Knowledge base search abstraction
//! - `providers`: Chat completion provider abstraction (OpenAI-compatible, Ollama)
//! - `prompts`: Classification and response templates
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use helpdesk::commands::{build_router, open_store};
//! use helpdesk::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/helpdesk.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = open_store(&config)?;
//!     let router = build_router(config, store)?;
//!     println!("{}", router.get_response("How do I reset my password?").await);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod memory;
pub mod prompts;
pub mod providers;
pub mod retrieval;
pub mod router;
pub mod storage;
pub mod tickets;

// Re-export commonly used types
pub use classifier::{Intent, IntentClassifier};
pub use config::Config;
pub use error::{HelpdeskError, Result};
pub use memory::{ConversationMemory, SessionMemoryStore};
pub use router::{ConversationRouter, RouteOutcome, TicketOutcome};
pub use storage::{SledTicketStore, TicketStore};
pub use tickets::{parse_ticket, Ticket};

#[cfg(test)]
pub mod test_utils;
