//! Routing metrics
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.
//!
//! # Metrics
//!
//! - `helpdesk_queries_total`: Counter of routed queries by intent
//! - `helpdesk_tickets_created_total`: Counter of ticket-creation outcomes
//!   (`persisted`, `store_failed`, `unconfirmed`, `malformed`)
//! - `helpdesk_request_failures_total`: Counter of failed requests by kind
//! - `helpdesk_route_duration_seconds`: Histogram of routing time by intent

use crate::classifier::Intent;
use crate::error::HelpdeskError;
use metrics::{histogram, increment_counter};
use std::time::Instant;

/// Timer and counters for one routed query
#[derive(Debug)]
pub struct RouteMetrics {
    start: Instant,
}

impl RouteMetrics {
    /// Start timing a query
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record the classified intent
    pub fn record_intent(&self, intent: Intent) {
        increment_counter!("helpdesk_queries_total", "intent" => intent.as_str());
    }

    /// Record the outcome of a ticket-creation attempt
    pub fn record_ticket_outcome(&self, outcome: &'static str) {
        increment_counter!("helpdesk_tickets_created_total", "outcome" => outcome);
    }

    /// Record successful completion of the route
    pub fn record_completion(&self, intent: Intent) {
        histogram!(
            "helpdesk_route_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "intent" => intent.as_str()
        );
    }

    /// Record a request that failed before producing a response
    pub fn record_failure(&self, error: &anyhow::Error) {
        increment_counter!("helpdesk_request_failures_total", "kind" => failure_kind(error));
    }
}

/// Short label for an error, used as a metric dimension
pub fn failure_kind(error: &anyhow::Error) -> &'static str {
    match error.downcast_ref::<HelpdeskError>() {
        Some(HelpdeskError::Timeout { .. }) => "timeout",
        Some(HelpdeskError::Provider(_)) | Some(HelpdeskError::Http(_)) => "provider",
        Some(HelpdeskError::Retrieval(_)) => "retrieval",
        Some(HelpdeskError::Storage(_)) | Some(HelpdeskError::Database(_)) => "storage",
        Some(HelpdeskError::MalformedTicket(_)) => "malformed_ticket",
        Some(HelpdeskError::ContactNotFound(_)) => "contact_not_found",
        Some(_) => "internal",
        None => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_labels() {
        let timeout: anyhow::Error = HelpdeskError::Timeout {
            operation: "completion".to_string(),
            seconds: 1,
        }
        .into();
        assert_eq!(failure_kind(&timeout), "timeout");

        let storage: anyhow::Error = HelpdeskError::Storage("x".to_string()).into();
        assert_eq!(failure_kind(&storage), "storage");

        let other = anyhow::anyhow!("plain");
        assert_eq!(failure_kind(&other), "unknown");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = RouteMetrics::start();
        metrics.record_intent(Intent::Generic);
        metrics.record_ticket_outcome("persisted");
        metrics.record_completion(Intent::Generic);
        metrics.record_failure(&anyhow::anyhow!("boom"));
    }
}
