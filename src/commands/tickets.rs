//! Ticket listing command
//!
//! Prints a user's stored tickets as a table or as JSON, for
//! `helpdesk tickets list` and the `/tickets` chat command.

use crate::error::Result;
use crate::storage::{SledTicketStore, StoredTicket};
use colored::Colorize;
use prettytable::{format, Table};

const SUBJECT_WIDTH: usize = 40;

/// List a user's tickets as a table or as JSON
///
/// # Errors
///
/// Returns error if the store cannot be read or JSON encoding fails
pub async fn list_tickets(store: &SledTicketStore, username: &str, json: bool) -> Result<()> {
    let records = store.records(username).await?;

    if json {
        println!("{}", render_json(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", format!("No tickets found for {}.", username).yellow());
        return Ok(());
    }

    println!("\nTickets for {}:", username.cyan());
    build_table(&records).printstd();
    println!();
    Ok(())
}

/// Encode records as pretty JSON
pub fn render_json(records: &[StoredTicket]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Build the ticket table shown by `tickets list` and `/tickets`
pub fn build_table(records: &[StoredTicket]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "Ticket ID".bold(),
        "Subject".bold(),
        "Status".bold(),
        "Priority".bold(),
        "Created".bold()
    ]);

    for record in records {
        table.add_row(prettytable::row![
            record.ticket_id.cyan(),
            truncate(&record.subject, SUBJECT_WIDTH),
            record.status,
            record.priority,
            record.created_at
        ]);
    }

    table
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
