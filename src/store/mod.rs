// src/store/mod.rs

pub mod sqlite;

pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::record::ChampionRecord;

pub const DATABASE_NAME: &str = "world_champions";
pub const COLLECTION_NAME: &str = "champions";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("connecting to document store: {0}")]
    Connect(#[source] rusqlite::Error),
    #[error("encoding record for {collection}: {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("writing collection {collection}: {source}")]
    Write {
        collection: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("reading collection {collection}: {source}")]
    Read {
        collection: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("decoding document in {collection}: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store handle poisoned by an earlier panic")]
    Poisoned,
}

/// Logical `database.collection` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DATABASE_NAME, COLLECTION_NAME)
    }
}

impl Namespace {
    pub fn new(database: &str, collection: &str) -> Self {
        Self {
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// A document collection holding the current standings snapshot.
pub trait ChampionStore: Send {
    /// Replace the whole collection with `records`. Returns the stored count.
    fn replace_collection(&mut self, records: &[ChampionRecord]) -> Result<usize, PersistenceError>;

    /// Every document, identifiers stripped, in insertion order.
    fn find_all(&self) -> Result<Vec<ChampionRecord>, PersistenceError>;
}
