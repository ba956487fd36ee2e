use async_trait::async_trait;
use helpdesk::config::Config;
use helpdesk::error::{HelpdeskError, Result};
use helpdesk::providers::{CompletionResponse, Message, Provider};
use helpdesk::retrieval::{ContextRetriever, Passage};
use helpdesk::storage::SledTicketStore;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Provider that replays canned replies and records every request
#[allow(dead_code)]
pub struct CannedProvider {
    replies: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<Vec<Message>>>,
}

#[allow(dead_code)]
impl CannedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for CannedProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => Ok(CompletionResponse::new(Message::assistant(reply))),
            None => Err(HelpdeskError::Provider("no canned reply left".to_string()).into()),
        }
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Retriever returning the same passages for every query
#[allow(dead_code)]
#[derive(Default)]
pub struct StaticRetriever {
    passages: Vec<Passage>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl StaticRetriever {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self {
            passages,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextRetriever for StaticRetriever {
    async fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.passages.iter().take(top_k).cloned().collect())
    }
}

#[allow(dead_code)]
pub fn create_temp_store() -> (SledTicketStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledTicketStore::open(tmp.path().join("tickets"))
        .expect("failed to open sled ticket store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("helpdesk.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.timeouts.classification_seconds = 2;
    config.timeouts.completion_seconds = 2;
    config.timeouts.retrieval_seconds = 2;
    config.timeouts.store_seconds = 2;
    config
}

#[allow(dead_code)]
pub fn ticket_block(id: &str, subject: &str) -> String {
    format!(
        "Ticket ID: {},\nSubject: {},\nDescription: Reported through chat,\nStatus: Open,\nPriority: High,\nCreated at: 2024-05-02 10:15:00",
        id, subject
    )
}
