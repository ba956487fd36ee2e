//! Conversation routing
//!
//! A query runs through `Classifying`, then one of `Creating`, `Retrieving`
//! or `Answering`, then back to idle. Each run is independent apart from
//! the session's conversation memory. Within one session runs are
//! serialised; different sessions proceed concurrently.

pub mod metrics;
pub mod strategy;

use crate::classifier::{Intent, IntentClassifier};
use crate::config::Config;
use crate::error::{
    with_timeout, HelpdeskError, Result, GENERIC_FAILURE_MESSAGE, MALFORMED_TICKET_MESSAGE,
};
use crate::memory::SessionMemoryStore;
use crate::prompts::ResponseStrategy;
use crate::providers::{Message, Provider};
use crate::retrieval::{format_context, ContextRetriever};
use crate::storage::TicketStore;
use crate::tickets::{format_tickets, parse_ticket, Ticket};
use chrono::{DateTime, Utc};
use self::metrics::RouteMetrics;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of the wall-clock time handed to the ticket-creation step
pub type Clock = fn() -> DateTime<Utc>;

/// Timestamp layout appended to ticket-creation queries
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What happened to the ticket on the creation path
#[derive(Debug, Clone, PartialEq)]
pub enum TicketOutcome {
    /// The query was not a ticket-creation request
    NotApplicable,
    /// The ticket was parsed and stored
    Persisted(Ticket),
    /// The ticket was parsed but the write failed; the generated text was
    /// still returned to the user
    StoreFailed {
        /// The parsed ticket that was not stored
        ticket: Ticket,
        /// Store error description, for logs and operators
        error: String,
    },
    /// The write did not report back within the store timeout
    ///
    /// The write keeps running and may still land; retrying could create a
    /// duplicate record.
    WriteUnconfirmed {
        /// The parsed ticket whose write is still pending
        ticket: Ticket,
        /// Store timeout that elapsed
        seconds: u64,
    },
    /// The generated text did not follow the ticket format
    Malformed {
        /// Why parsing failed
        reason: String,
    },
}

/// Result of routing one query
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    /// Classified intent
    pub intent: Intent,
    /// Text shown to the user
    pub response: String,
    /// Ticket side effect on the creation path
    pub ticket: TicketOutcome,
}

/// Classifier-driven router over the response strategies
pub struct ConversationRouter {
    classifier: IntentClassifier,
    provider: Arc<dyn Provider>,
    retriever: Arc<dyn ContextRetriever>,
    store: Arc<dyn TicketStore>,
    memory: SessionMemoryStore,
    session_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    config: Config,
    clock: Clock,
}

impl ConversationRouter {
    /// Create a router over injected collaborators
    ///
    /// # Arguments
    ///
    /// * `provider` - Completion service for classification and responses
    /// * `retriever` - Knowledge base search
    /// * `store` - Ticket persistence shared by the whole process
    /// * `config` - Retrieval, memory and timeout settings
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn ContextRetriever>,
        store: Arc<dyn TicketStore>,
        config: Config,
    ) -> Self {
        let classifier =
            IntentClassifier::new(provider.clone(), config.timeouts.classification_seconds);
        let memory = SessionMemoryStore::new(config.memory.token_limit, config.memory.ttl());
        Self {
            classifier,
            provider,
            retriever,
            store,
            memory,
            session_locks: Mutex::new(HashMap::new()),
            config,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Conversation memory of every session
    pub fn memory(&self) -> &SessionMemoryStore {
        &self.memory
    }

    /// The ticket store this router writes to
    pub fn store(&self) -> &Arc<dyn TicketStore> {
        &self.store
    }

    /// Answer a query for the configured default session and user
    ///
    /// Never fails: any error is logged and replaced by a user-facing
    /// message.
    pub async fn get_response(&self, query: &str) -> String {
        let session = self.config.memory.session_key.clone();
        let username = self.config.store.username.clone();
        self.respond(&session, &username, query).await
    }

    /// Answer a query for an explicit session and user
    ///
    /// Like `get_response`, failures become a user-facing message.
    pub async fn respond(&self, session: &str, username: &str, query: &str) -> String {
        match self.route(session, username, query).await {
            Ok(outcome) => outcome.response,
            Err(e) => failure_message(&e),
        }
    }

    /// Route a query through classification, generation and side effects
    ///
    /// # Arguments
    ///
    /// * `session` - Conversation memory key
    /// * `username` - Owner of the ticket collection
    /// * `query` - User text
    ///
    /// # Errors
    ///
    /// Returns error if classification, retrieval, generation or the ticket
    /// read fails. A malformed ticket, a failed ticket write or a write that
    /// outlives the store timeout is not an error; it is reported through
    /// `RouteOutcome::ticket`.
    pub async fn route(&self, session: &str, username: &str, query: &str) -> Result<RouteOutcome> {
        let lock = self.session_lock(session);
        let guard = lock.lock().await;

        let metrics = RouteMetrics::start();
        let result = self.route_locked(session, username, query, &metrics).await;
        match &result {
            Ok(outcome) => metrics.record_completion(outcome.intent),
            Err(e) => {
                metrics.record_failure(e);
                tracing::error!(session = %session, "Failed to route query: {:#}", e);
            }
        }

        drop(guard);
        self.release_session_lock(session, lock);
        result
    }

    /// Drop expired session memories and idle session locks
    ///
    /// Returns the number of expired sessions removed.
    pub fn purge_expired(&self) -> usize {
        let purged = self.memory.purge_expired();
        self.lock_map().retain(|_, lock| Arc::strong_count(lock) > 1);
        purged
    }

    /// Sessions that currently hold or wait for a routing lock
    pub fn active_sessions(&self) -> usize {
        self.lock_map().len()
    }

    async fn route_locked(
        &self,
        session: &str,
        username: &str,
        query: &str,
        metrics: &RouteMetrics,
    ) -> Result<RouteOutcome> {
        let intent = self.classifier.classify(query).await?;
        metrics.record_intent(intent);
        tracing::info!(session = %session, intent = %intent, "Routing query");

        let history = self.memory.history(session);
        let outcome = match intent {
            Intent::CreateTicket => self.create_ticket(username, query, &history, metrics).await?,
            Intent::RetrieveTicket => self.list_tickets(username, query, &history).await?,
            Intent::Generic => self.answer(query, &history).await?,
        };

        self.memory.record_turn(session, query, &outcome.response);
        Ok(outcome)
    }

    async fn create_ticket(
        &self,
        username: &str,
        query: &str,
        history: &[Message],
        metrics: &RouteMetrics,
    ) -> Result<RouteOutcome> {
        let now = (self.clock)().format(TIMESTAMP_FORMAT).to_string();
        let stamped_query = format!("{}\nCurrent time: {}", query, now);
        let context = self.retrieve_context(query).await?;

        let generated = strategy::respond(
            self.provider.as_ref(),
            ResponseStrategy::TicketCreation,
            &context,
            history,
            &stamped_query,
            self.config.timeouts.completion_seconds,
        )
        .await?;

        let ticket = match parse_ticket(&generated) {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::warn!("Generated ticket could not be parsed: {}", e);
                metrics.record_ticket_outcome("malformed");
                return Ok(RouteOutcome {
                    intent: Intent::CreateTicket,
                    response: MALFORMED_TICKET_MESSAGE.to_string(),
                    ticket: TicketOutcome::Malformed {
                        reason: e.to_string(),
                    },
                });
            }
        };

        let ticket_outcome = self.persist_ticket(ticket, username, metrics).await;

        Ok(RouteOutcome {
            intent: Intent::CreateTicket,
            response: generated,
            ticket: ticket_outcome,
        })
    }

    async fn persist_ticket(
        &self,
        ticket: Ticket,
        username: &str,
        metrics: &RouteMetrics,
    ) -> TicketOutcome {
        // Spawned so the write is still observed after the timeout fires.
        let store = self.store.clone();
        let record = ticket.clone();
        let owner = username.to_string();
        let mut write = tokio::spawn(async move { store.insert(&record, &owner).await });

        let seconds = self.config.timeouts.store_seconds;
        let result = match tokio::time::timeout(Duration::from_secs(seconds), &mut write).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(
                    ticket_id = %ticket.ticket_id,
                    user = %username,
                    "Ticket write still pending after {} seconds",
                    seconds
                );
                metrics.record_ticket_outcome("unconfirmed");
                let ticket_id = ticket.ticket_id.clone();
                let owner = username.to_string();
                tokio::spawn(async move {
                    match write.await {
                        Ok(Ok(())) => {
                            tracing::info!(
                                ticket_id = %ticket_id,
                                user = %owner,
                                "Delayed ticket write completed"
                            );
                        }
                        Ok(Err(e)) => {
                            tracing::error!(
                                ticket_id = %ticket_id,
                                user = %owner,
                                "Delayed ticket write failed: {:#}",
                                e
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                ticket_id = %ticket_id,
                                user = %owner,
                                "Delayed ticket write aborted: {}",
                                e
                            );
                        }
                    }
                });
                return TicketOutcome::WriteUnconfirmed { ticket, seconds };
            }
        };

        let write_error = match result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(e) => Some(HelpdeskError::Storage(format!("Write task failed: {}", e)).into()),
        };

        match write_error {
            None => {
                tracing::info!(ticket_id = %ticket.ticket_id, user = %username, "Ticket stored");
                metrics.record_ticket_outcome("persisted");
                TicketOutcome::Persisted(ticket)
            }
            Some(e) => {
                tracing::error!(
                    ticket_id = %ticket.ticket_id,
                    user = %username,
                    "Ticket write failed, returning generated text anyway: {:#}",
                    e
                );
                metrics.record_ticket_outcome("store_failed");
                TicketOutcome::StoreFailed {
                    ticket,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn list_tickets(
        &self,
        username: &str,
        query: &str,
        history: &[Message],
    ) -> Result<RouteOutcome> {
        let tickets = with_timeout(
            "ticket read",
            self.config.timeouts.store_seconds,
            self.store.retrieve_all(username),
        )
        .await?;
        tracing::debug!(user = %username, count = tickets.len(), "Loaded tickets");

        let response = strategy::respond(
            self.provider.as_ref(),
            ResponseStrategy::TicketListing,
            &format_tickets(&tickets),
            history,
            query,
            self.config.timeouts.completion_seconds,
        )
        .await?;

        Ok(RouteOutcome {
            intent: Intent::RetrieveTicket,
            response,
            ticket: TicketOutcome::NotApplicable,
        })
    }

    async fn answer(&self, query: &str, history: &[Message]) -> Result<RouteOutcome> {
        let context = self.retrieve_context(query).await?;
        let response = strategy::respond(
            self.provider.as_ref(),
            ResponseStrategy::PlainAnswer,
            &context,
            history,
            query,
            self.config.timeouts.completion_seconds,
        )
        .await?;

        Ok(RouteOutcome {
            intent: Intent::Generic,
            response,
            ticket: TicketOutcome::NotApplicable,
        })
    }

    async fn retrieve_context(&self, query: &str) -> Result<String> {
        let passages = with_timeout(
            "retrieval",
            self.config.timeouts.retrieval_seconds,
            self.retriever.retrieve(query, self.config.retriever.top_k),
        )
        .await?;
        Ok(format_context(&passages))
    }

    fn lock_map(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
        self.session_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn session_lock(&self, session: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.lock_map()
            .entry(session.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    // Clones are only taken under the map lock, so a count of two (map plus
    // caller) means no other route holds or waits on this session.
    fn release_session_lock(&self, session: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.lock_map();
        let idle = locks
            .get(session)
            .map(|current| Arc::ptr_eq(current, &lock) && Arc::strong_count(&lock) == 2)
            .unwrap_or(false);
        if idle {
            locks.remove(session);
        }
    }
}

/// User-facing text for a failed route
pub fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<HelpdeskError>() {
        Some(e) => e.user_message(),
        None => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}
