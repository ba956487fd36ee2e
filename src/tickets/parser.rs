//! Ticket text parser
//!
//! The ticket-creation prompt asks the model for one `Key: Value` pair per
//! line with lines separated by `",\n"`. Values are mapped to fields by
//! position, not by key, so label drift ("ID" vs "Ticket ID") is tolerated.

use crate::error::{HelpdeskError, Result};
use crate::tickets::Ticket;

/// Field labels in the order the parser maps them
pub const TICKET_FIELDS: [&str; 7] = [
    "Ticket ID",
    "Subject",
    "Description",
    "Status",
    "Priority",
    "Created at",
    "Updated at",
];

/// Number of fields that must be present
pub const REQUIRED_FIELDS: usize = 6;

const LINE_DELIMITER: &str = ",\n";
const KEY_SEPARATOR: &str = ": ";

/// Parse model output into a ticket
///
/// # Arguments
///
/// * `raw` - Text expected to follow the ticket line format
///
/// # Errors
///
/// Returns `HelpdeskError::MalformedTicket` when fewer than six lines are
/// present, a line lacks the `": "` separator, or a value is empty.
///
/// # Examples
///
/// ```
/// use helpdesk::tickets::parse_ticket;
///
/// let raw = "ID: T-9,\nTitle: Login fails,\nDetails: 500 on submit,\nStatus: Open,\nPriority: High,\nDate: 2024-05-02";
/// let ticket = parse_ticket(raw).unwrap();
/// assert_eq!(ticket.ticket_id, "T-9");
/// assert_eq!(ticket.created_at, "2024-05-02");
/// ```
pub fn parse_ticket(raw: &str) -> Result<Ticket> {
    let normalized = raw.replace("\r\n", "\n");
    let segments: Vec<&str> = normalized
        .split(LINE_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() < REQUIRED_FIELDS {
        return Err(HelpdeskError::MalformedTicket(format!(
            "expected at least {} lines, found {}",
            REQUIRED_FIELDS,
            segments.len()
        ))
        .into());
    }

    let mut values = Vec::with_capacity(TICKET_FIELDS.len());
    for (index, segment) in segments.iter().take(TICKET_FIELDS.len()).enumerate() {
        let (_, value) = segment.split_once(KEY_SEPARATOR).ok_or_else(|| {
            HelpdeskError::MalformedTicket(format!(
                "line {} has no \"{}\" separator",
                index + 1,
                KEY_SEPARATOR
            ))
        })?;
        let value = value.trim();
        if value.is_empty() {
            return Err(HelpdeskError::MalformedTicket(format!(
                "{} is empty",
                TICKET_FIELDS[index]
            ))
            .into());
        }
        values.push(value.to_string());
    }

    if segments.len() > TICKET_FIELDS.len() {
        tracing::debug!(
            "Ignoring {} trailing ticket lines",
            segments.len() - TICKET_FIELDS.len()
        );
    }

    let mut values = values.into_iter();
    let mut next = || values.next().unwrap_or_default();
    let ticket_id = next();
    let subject = next();
    let description = next();
    let status = next();
    let priority = next();
    let created_at = first_line(next());
    let updated_at = Some(next()).filter(|v| !v.is_empty()).map(first_line);

    Ok(Ticket {
        ticket_id,
        subject,
        description,
        status,
        priority,
        created_at,
        updated_at,
    })
}

// Timestamps are single-line; anything after is model chatter.
fn first_line(value: String) -> String {
    match value.split_once('\n') {
        Some((line, _)) => line.trim_end().to_string(),
        None => value,
    }
}
