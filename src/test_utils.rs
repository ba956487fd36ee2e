//! Test utilities for Helpdesk
//!
//! Hand-written fakes for the completion provider, the context retriever and
//! the ticket store, plus small assertion helpers.

use crate::config::Config;
use crate::error::{HelpdeskError, Result};
use crate::providers::{CompletionResponse, Message, Provider};
use crate::retrieval::{ContextRetriever, Passage};
use crate::storage::TicketStore;
use crate::tickets::Ticket;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Provider that replies with a fixed script and records every request
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    /// Reply with `replies` in order, one per call
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            calls: Mutex::new(Vec::new()),
            failure: None,
            delay: None,
        }
    }

    /// Fail every call with a provider error
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every message list received, in call order
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = &self.failure {
            return Err(HelpdeskError::Provider(failure.clone()).into());
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| HelpdeskError::Provider("script exhausted".to_string()))?;
        Ok(CompletionResponse::new(Message::assistant(reply)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Retriever returning fixed passages and counting calls
#[derive(Default)]
pub struct FixedRetriever {
    passages: Vec<Passage>,
    calls: AtomicUsize,
}

impl FixedRetriever {
    /// Return `passages` for every query
    pub fn new(passages: Vec<Passage>) -> Self {
        Self {
            passages,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of retrieve calls
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextRetriever for FixedRetriever {
    async fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.passages.iter().take(top_k).cloned().collect())
    }
}

/// In-memory ticket store counting inserts and reads
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: Mutex<HashMap<String, Vec<Ticket>>>,
    insert_calls: AtomicUsize,
    retrieve_calls: AtomicUsize,
    fail_inserts: bool,
    insert_delay: Option<Duration>,
}

impl MemoryTicketStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose inserts always fail
    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    /// Store whose inserts complete only after `delay`
    pub fn slow_inserts(delay: Duration) -> Self {
        Self {
            insert_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Store pre-filled with tickets for a user
    pub fn with_tickets(username: &str, tickets: Vec<Ticket>) -> Self {
        let store = Self::default();
        store
            .tickets
            .lock()
            .unwrap()
            .insert(username.to_string(), tickets);
        store
    }

    /// Number of insert calls, successful or not
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Number of retrieve_all calls
    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    /// Tickets currently held for a user
    pub fn tickets_for(&self, username: &str) -> Vec<Ticket> {
        self.tickets
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn insert(&self, ticket: &Ticket, username: &str) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.insert_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_inserts {
            return Err(HelpdeskError::Storage("disk full".to_string()).into());
        }
        self.tickets
            .lock()
            .unwrap()
            .entry(username.to_string())
            .or_default()
            .push(ticket.clone());
        Ok(())
    }

    async fn retrieve_all(&self, username: &str) -> Result<Vec<Ticket>> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tickets_for(username))
    }
}

/// A well-formed ticket block as the model would produce it
pub fn sample_ticket_block() -> String {
    "Ticket ID: TCK-1001,\nSubject: VPN disconnects hourly,\nDescription: The corporate VPN drops the connection every hour,\nStatus: In review,\nPriority: Medium,\nCreated at: 2024-05-02 10:15:00".to_string()
}

/// The ticket `sample_ticket_block` parses to
pub fn sample_ticket() -> Ticket {
    Ticket {
        ticket_id: "TCK-1001".to_string(),
        subject: "VPN disconnects hourly".to_string(),
        description: "The corporate VPN drops the connection every hour".to_string(),
        status: "In review".to_string(),
        priority: "Medium".to_string(),
        created_at: "2024-05-02 10:15:00".to_string(),
        updated_at: None,
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}' but got Ok({:?})", expected, value),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration with short timeouts for router tests
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.timeouts.classification_seconds = 2;
    config.timeouts.completion_seconds = 2;
    config.timeouts.retrieval_seconds = 2;
    config.timeouts.store_seconds = 2;
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::parse_ticket;

    #[test]
    fn test_sample_block_parses_to_sample_ticket() {
        assert_eq!(parse_ticket(&sample_ticket_block()).unwrap(), sample_ticket());
    }

    #[test]
    fn test_assert_error_contains() {
        let result: Result<()> = Err(HelpdeskError::Config("invalid".to_string()).into());
        assert_error_contains(result, "invalid");
    }
}
