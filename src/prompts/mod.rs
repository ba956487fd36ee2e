//! Prompts for classification and response generation
//!
//! This module provides the fixed instruction texts sent to the completion
//! service: one classification prompt per classifier variant and one
//! system/template pair per response strategy.

pub mod classification_prompt;
pub mod response_prompt;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Response strategy selected by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStrategy {
    /// Retrieval-augmented answer to a question
    PlainAnswer,
    /// Strict ticket-format generation
    TicketCreation,
    /// Friendly listing of existing tickets
    TicketListing,
}

impl ResponseStrategy {
    /// System prompt for this strategy
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::prompts::ResponseStrategy;
    ///
    /// let prompt = ResponseStrategy::TicketCreation.system_prompt();
    /// assert!(prompt.contains("Ticket ID:"));
    /// ```
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::PlainAnswer => response_prompt::SUPPORT_SYSTEM_PROMPT,
            Self::TicketCreation => response_prompt::TICKET_CREATION_SYSTEM_PROMPT,
            Self::TicketListing => response_prompt::TICKET_LISTING_SYSTEM_PROMPT,
        }
    }

    /// User prompt template with `{context_str}` and `{query_str}` placeholders
    pub fn user_template(self) -> &'static str {
        match self {
            Self::PlainAnswer => response_prompt::QA_TEMPLATE,
            Self::TicketCreation => response_prompt::TICKET_CREATION_TEMPLATE,
            Self::TicketListing => response_prompt::TICKET_LISTING_TEMPLATE,
        }
    }

    /// Render the user prompt for a context block and query
    pub fn render(self, context: &str, query: &str) -> String {
        response_prompt::render_template(self.user_template(), context, query)
    }
}

impl fmt::Display for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainAnswer => write!(f, "plain_answer"),
            Self::TicketCreation => write!(f, "ticket_creation"),
            Self::TicketListing => write!(f, "ticket_listing"),
        }
    }
}
