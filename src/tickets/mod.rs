//! Support ticket model
//!
//! Tickets arrive as model-generated text and are stored as given: the raw
//! field strings are kept, and typed views of status and priority are
//! offered on top of them.

pub mod parser;

pub use parser::{parse_ticket, TICKET_FIELDS};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly reported, not yet picked up
    Open,
    /// Being looked at; the default for new tickets
    InReview,
    /// Resolved or dismissed
    Closed,
}

impl TicketStatus {
    /// Parse a status label leniently
    ///
    /// Case, spaces, dashes and underscores are ignored, so "In review",
    /// "in_review" and "IN-REVIEW" all map to `InReview`.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::tickets::TicketStatus;
    ///
    /// assert_eq!(TicketStatus::from_label("In review"), Some(TicketStatus::InReview));
    /// assert_eq!(TicketStatus::from_label("pending"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        match normalize_label(label).as_str() {
            "open" => Some(Self::Open),
            "inreview" => Some(Self::InReview),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::InReview
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::InReview => write!(f, "In review"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Urgency of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    /// Can wait
    Low,
    /// The default for new tickets
    Medium,
    /// Blocking the user
    High,
}

impl TicketPriority {
    /// Parse a priority label leniently
    pub fn from_label(label: &str) -> Option<Self> {
        match normalize_label(label).as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A support ticket as produced by the ticket-creation step
///
/// Field values are best-effort model output. Nothing here guarantees that
/// `status` is a known label or that `created_at` is a valid date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Model-generated identifier, not checked for uniqueness
    pub ticket_id: String,
    /// Short summary
    pub subject: String,
    /// Free-text description of the issue
    pub description: String,
    /// Status label as generated
    pub status: String,
    /// Priority label as generated
    pub priority: String,
    /// Creation timestamp as generated
    pub created_at: String,
    /// Last update timestamp, when the model emitted one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Ticket {
    /// Typed status, when the label is recognised
    pub fn status_kind(&self) -> Option<TicketStatus> {
        TicketStatus::from_label(&self.status)
    }

    /// Typed priority, when the label is recognised
    pub fn priority_kind(&self) -> Option<TicketPriority> {
        TicketPriority::from_label(&self.priority)
    }

    /// Render the ticket in the line format the parser reads
    ///
    /// Used when listing existing tickets to the model as context.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::tickets::{parse_ticket, Ticket};
    ///
    /// let ticket = Ticket {
    ///     ticket_id: "TCK-1".into(),
    ///     subject: "VPN drops".into(),
    ///     description: "Disconnects every hour".into(),
    ///     status: "Open".into(),
    ///     priority: "High".into(),
    ///     created_at: "2024-05-02".into(),
    ///     updated_at: None,
    /// };
    /// assert_eq!(parse_ticket(&ticket.to_block()).unwrap(), ticket);
    /// ```
    pub fn to_block(&self) -> String {
        let mut values = vec![
            self.ticket_id.as_str(),
            self.subject.as_str(),
            self.description.as_str(),
            self.status.as_str(),
            self.priority.as_str(),
            self.created_at.as_str(),
        ];
        if let Some(updated_at) = &self.updated_at {
            values.push(updated_at.as_str());
        }
        TICKET_FIELDS
            .iter()
            .zip(values)
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join(",\n")
    }
}

/// Format a list of tickets as a context block
pub fn format_tickets(tickets: &[Ticket]) -> String {
    if tickets.is_empty() {
        return "(no tickets found)".to_string();
    }
    tickets
        .iter()
        .map(Ticket::to_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}
