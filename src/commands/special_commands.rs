//! Special commands parser for interactive chat mode
//!
//! Special commands are entered during a chat session and are handled
//! locally instead of being routed to the support bot:
//! - List the user's tickets straight from the store
//! - Show conversation memory usage
//! - Forget the current conversation
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// List stored tickets without going through the model
    Tickets,

    /// Show how much of the memory budget the session uses
    Memory,

    /// Forget the session's conversation memory
    Clear,

    /// Display help information
    Help,

    /// Exit the chat session
    Exit,

    /// Not a special command; route the input as a query
    None,
}

/// Parse user input into a special command
///
/// Plain `exit` and `quit` are accepted without the slash.
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognised `/` command
///
/// # Examples
///
/// ```
/// use helpdesk::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/tickets"), Ok(SpecialCommand::Tickets));
/// assert_eq!(parse_special_command("My printer is broken"), Ok(SpecialCommand::None));
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/tickets" => Ok(SpecialCommand::Tickets),
        "/memory" | "/context" => Ok(SpecialCommand::Memory),
        "/clear" | "/reset" => Ok(SpecialCommand::Clear),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the special command reference
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

TICKETS:
  /tickets        - List your stored tickets

SESSION:
  /memory         - Show conversation memory usage
  /context        - Same as /memory
  /clear          - Forget the conversation so far
  /help           - Show this help
  /exit, /quit    - Leave the chat (plain exit or quit also work)

Anything else is sent to the support bot. Ask a question, describe an
issue to get a ticket created, or ask to see your tickets.
"#
    );
}
