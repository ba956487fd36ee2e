//! Ticket persistence for Helpdesk
//!
//! Each username owns an append-only collection of tickets. The sled-backed
//! store keeps one tree per user, keyed by monotonically increasing ids so
//! that iteration order is insertion order.

use crate::error::{HelpdeskError, Result};
use crate::tickets::Ticket;
use async_trait::async_trait;
use directories::ProjectDirs;
use sled::Db;
use std::path::{Path, PathBuf};

pub mod types;
pub use types::StoredTicket;

const TREE_PREFIX: &str = "tickets/";

/// Per-user ticket collection storage
///
/// Duplicate ticket ids are not rejected: inserting the same `ticket_id`
/// twice stores two records.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Append a ticket to the user's collection, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::Storage` if the write fails
    async fn insert(&self, ticket: &Ticket, username: &str) -> Result<()>;

    /// Read every ticket of a user in insertion order
    ///
    /// Each call is a fresh read. Unknown users yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::Storage` if the read or decoding fails
    async fn retrieve_all(&self, username: &str) -> Result<Vec<Ticket>>;

    /// Make pending writes durable
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Ticket store backed by an embedded `sled` database
///
/// Cloning is cheap and shares the underlying database handle.
#[derive(Clone, Debug)]
pub struct SledTicketStore {
    db: Db,
}

impl SledTicketStore {
    /// Open or create a ticket store at `path`
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::StoreConnection` if the database cannot be
    /// opened (missing permissions, lock held by another process, ...)
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::storage::SledTicketStore;
    ///
    /// # fn main() -> helpdesk::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledTicketStore::open(dir.path().join("tickets"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            HelpdeskError::StoreConnection(format!(
                "Failed to open ticket store at {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::info!("Opened ticket store at {}", path.display());
        Ok(Self { db })
    }

    /// Default store location in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::StoreConnection` if no home directory can be
    /// determined
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "helpdesk", "helpdesk").ok_or_else(|| {
            HelpdeskError::StoreConnection("Could not determine data directory".into())
        })?;
        Ok(proj_dirs.data_dir().join("tickets"))
    }

    /// Read every stored record of a user, including store metadata
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::Storage` if the read or decoding fails
    pub async fn records(&self, username: &str) -> Result<Vec<StoredTicket>> {
        let db = self.db.clone();
        let tree_name = tree_name(username);
        tokio::task::spawn_blocking(move || read_tree(&db, &tree_name))
            .await
            .map_err(|e| HelpdeskError::Storage(format!("Read task failed: {}", e)))?
    }

    /// Usernames that have at least one ticket collection
    pub fn usernames(&self) -> Vec<String> {
        self.db
            .tree_names()
            .into_iter()
            .filter_map(|name| {
                std::str::from_utf8(&name)
                    .ok()
                    .and_then(|name| name.strip_prefix(TREE_PREFIX))
                    .map(str::to_string)
            })
            .collect()
    }
}

#[async_trait]
impl TicketStore for SledTicketStore {
    async fn insert(&self, ticket: &Ticket, username: &str) -> Result<()> {
        let db = self.db.clone();
        let tree_name = tree_name(username);
        let record = StoredTicket::new(ticket);

        tokio::task::spawn_blocking(move || -> Result<()> {
            let tree = db
                .open_tree(&tree_name)
                .map_err(|e| HelpdeskError::Storage(format!("Open tree failed: {}", e)))?;
            let key = db
                .generate_id()
                .map_err(|e| HelpdeskError::Storage(format!("Id generation failed: {}", e)))?;
            let value = serde_json::to_vec(&record)
                .map_err(|e| HelpdeskError::Storage(format!("Serialization failed: {}", e)))?;

            tree.insert(key.to_be_bytes(), value)
                .map_err(|e| HelpdeskError::Storage(format!("Insert failed: {}", e)))?;
            tree.flush()
                .map_err(|e| HelpdeskError::Storage(format!("Flush failed: {}", e)))?;

            tracing::debug!(
                "Stored ticket {} as record {} in {}",
                record.ticket_id,
                record.record_id,
                tree_name
            );
            Ok(())
        })
        .await
        .map_err(|e| HelpdeskError::Storage(format!("Write task failed: {}", e)))?
    }

    async fn retrieve_all(&self, username: &str) -> Result<Vec<Ticket>> {
        let records = self.records(username).await?;
        Ok(records.into_iter().map(Ticket::from).collect())
    }

    async fn flush(&self) -> Result<()> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            db.flush()
                .map_err(|e| HelpdeskError::Storage(format!("Flush failed: {}", e)))?;
            Ok(())
        })
        .await
        .map_err(|e| HelpdeskError::Storage(format!("Flush task failed: {}", e)))?
    }
}

fn tree_name(username: &str) -> String {
    format!("{}{}", TREE_PREFIX, username)
}

fn read_tree(db: &Db, tree_name: &str) -> Result<Vec<StoredTicket>> {
    // Reading must not create a collection for an unknown user.
    let exists = db
        .tree_names()
        .iter()
        .any(|name| name.as_ref() == tree_name.as_bytes());
    if !exists {
        return Ok(Vec::new());
    }

    let tree = db
        .open_tree(tree_name)
        .map_err(|e| HelpdeskError::Storage(format!("Open tree failed: {}", e)))?;

    let mut records = Vec::new();
    for item in tree.iter() {
        let (_, value) = item.map_err(|e| HelpdeskError::Storage(format!("Read failed: {}", e)))?;
        let record: StoredTicket = serde_json::from_slice(&value)
            .map_err(|e| HelpdeskError::Storage(format!("Deserialization failed: {}", e)))?;
        records.push(record);
    }
    Ok(records)
}
