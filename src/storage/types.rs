//! Persisted ticket document
//!
//! The on-disk JSON shape of one ticket record in a user's collection.

use crate::tickets::Ticket;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A ticket as persisted in a user's collection
///
/// Field names follow the document layout of the ticket database
/// (`Ticket_ID`, `Subject`, ...). `_id` and `stored_at` are assigned by the
/// store and are independent of the model-generated `Ticket_ID`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTicket {
    /// Store-assigned record identifier (ULID)
    #[serde(rename = "_id")]
    pub record_id: String,
    /// Model-generated ticket identifier
    #[serde(rename = "Ticket_ID")]
    pub ticket_id: String,
    /// One-line summary
    #[serde(rename = "Subject")]
    pub subject: String,
    /// Full description of the issue
    #[serde(rename = "Description")]
    pub description: String,
    /// Lifecycle status as generated (`Open`, `In review`, `Closed`)
    #[serde(rename = "Status")]
    pub status: String,
    /// Priority as generated (`Low`, `Medium`, `High`)
    #[serde(rename = "Priority")]
    pub priority: String,
    /// Creation timestamp as generated
    #[serde(rename = "Created_at")]
    pub created_at: String,
    /// Last update timestamp, absent for tickets never updated
    #[serde(
        rename = "Updated_at",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    /// When the record was written
    pub stored_at: DateTime<Utc>,
}

impl StoredTicket {
    /// Wrap a ticket in a new record
    pub fn new(ticket: &Ticket) -> Self {
        Self {
            record_id: Ulid::new().to_string(),
            ticket_id: ticket.ticket_id.clone(),
            subject: ticket.subject.clone(),
            description: ticket.description.clone(),
            status: ticket.status.clone(),
            priority: ticket.priority.clone(),
            created_at: ticket.created_at.clone(),
            updated_at: ticket.updated_at.clone(),
            stored_at: Utc::now(),
        }
    }
}

impl From<StoredTicket> for Ticket {
    fn from(stored: StoredTicket) -> Self {
        Self {
            ticket_id: stored.ticket_id,
            subject: stored.subject,
            description: stored.description,
            status: stored.status,
            priority: stored.priority,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}
