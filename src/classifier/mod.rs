//! Intent classification
//!
//! The classifier asks the completion service for a bare label and maps the
//! reply onto a fixed set of intents. Parsing is tolerant: the label may be
//! surrounded by other text, and output with no recognisable label falls
//! back to the catch-all intent instead of failing.

pub mod actions;

pub use actions::{parse_action, ActionIntent, ContactBook};

use crate::error::{with_timeout, Result};
use crate::prompts::classification_prompt::{
    action_classification_prompt, ticket_classification_prompt,
};
use crate::providers::{Message, Provider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Ticket-lifecycle intent of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The user wants a ticket filed
    CreateTicket,
    /// The user wants to see existing tickets
    RetrieveTicket,
    /// Anything else; answered from the knowledge base
    Generic,
}

impl Intent {
    /// Labels checked against model output, most specific first
    pub const PRIORITY: [(Intent, &'static str); 2] = [
        (Intent::CreateTicket, "create_ticket"),
        (Intent::RetrieveTicket, "retrieve_ticket"),
    ];

    /// Label used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateTicket => "create_ticket",
            Self::RetrieveTicket => "retrieve_ticket",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase and fold spaces and dashes to underscores
pub(crate) fn normalize_output(output: &str) -> String {
    output
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Map classifier output to an intent
///
/// Labels are matched case-insensitively as substrings in the order of
/// `Intent::PRIORITY`; the first hit wins. No hit yields `Intent::Generic`.
///
/// # Examples
///
/// ```
/// use helpdesk::classifier::{parse_intent, Intent};
///
/// assert_eq!(parse_intent("Classification: Create_Ticket"), Intent::CreateTicket);
/// assert_eq!(parse_intent("retrieve ticket"), Intent::RetrieveTicket);
/// assert_eq!(parse_intent("what color is the sky"), Intent::Generic);
/// ```
pub fn parse_intent(output: &str) -> Intent {
    let normalized = normalize_output(output);
    for (intent, label) in Intent::PRIORITY {
        if normalized.contains(label) {
            return intent;
        }
    }
    tracing::debug!("No intent label in classifier output, defaulting to generic");
    Intent::Generic
}

/// Classifier backed by a completion provider
pub struct IntentClassifier {
    provider: Arc<dyn Provider>,
    timeout_seconds: u64,
}

impl IntentClassifier {
    /// Create a classifier
    ///
    /// # Arguments
    ///
    /// * `provider` - Completion service used for classification
    /// * `timeout_seconds` - Limit for each classification call
    pub fn new(provider: Arc<dyn Provider>, timeout_seconds: u64) -> Self {
        Self {
            provider,
            timeout_seconds,
        }
    }

    /// Classify a query into a ticket-lifecycle intent
    ///
    /// The query is sent alone, without conversation history.
    ///
    /// # Errors
    ///
    /// Returns error if the completion call fails or times out. Unrecognised
    /// output is not an error.
    pub async fn classify(&self, query: &str) -> Result<Intent> {
        let output = self.complete(ticket_classification_prompt(query)).await?;
        let intent = parse_intent(&output);
        tracing::debug!(intent = %intent, "Classified query");
        Ok(intent)
    }

    /// Classify a query into an action intent
    ///
    /// # Errors
    ///
    /// Returns error if the completion call fails or times out
    pub async fn classify_action(&self, query: &str) -> Result<ActionIntent> {
        let output = self.complete(action_classification_prompt(query)).await?;
        Ok(parse_action(&output))
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        let messages = [Message::user(prompt)];
        let response = with_timeout(
            "classification",
            self.timeout_seconds,
            self.provider.complete(&messages),
        )
        .await?;
        Ok(response.message.content)
    }
}
