// src/store/sqlite.rs

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{ChampionStore, Namespace, PersistenceError};
use crate::record::ChampionRecord;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Document collections kept as SQLite tables of JSON bodies.
///
/// Each collection is a table `<database>__<collection>` with a hidden
/// `_id` key; readers only ever get the decoded body back.
pub struct SqliteStore {
    conn: Connection,
    namespace: Namespace,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open the store at `uri`: a file path, `sqlite://<path>`, or `:memory:`.
    pub fn open(uri: &str, namespace: Namespace) -> Result<Self, PersistenceError> {
        let path = uri.strip_prefix("sqlite://").unwrap_or(uri);
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(PersistenceError::Connect)?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(PersistenceError::Connect)?;
        debug!(%namespace, "opened document store");
        Ok(Self { conn, namespace })
    }

    pub fn open_in_memory(namespace: Namespace) -> Result<Self, PersistenceError> {
        Self::open(":memory:", namespace)
    }

    fn table(&self) -> String {
        format!("{}__{}", self.namespace.database, self.namespace.collection)
    }

    fn write_err(&self) -> impl Fn(rusqlite::Error) -> PersistenceError + '_ {
        move |source| PersistenceError::Write {
            collection: self.namespace.to_string(),
            source,
        }
    }

    fn table_exists(&self, table: &str) -> Result<bool, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
    }

    /// Fill a fresh staging table. Nothing live is touched here.
    fn write_staging(&mut self, staging: &str, docs: &[String]) -> Result<(), rusqlite::Error> {
        let loaded_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            r#"CREATE TABLE "{staging}" (
                _id INTEGER PRIMARY KEY AUTOINCREMENT,
                doc TEXT NOT NULL,
                loaded_at TEXT NOT NULL
            );"#
        ))?;
        {
            let mut stmt =
                tx.prepare(&format!(r#"INSERT INTO "{staging}" (doc, loaded_at) VALUES (?1, ?2)"#))?;
            for doc in docs {
                stmt.execute(params![doc, loaded_at])?;
            }
        }
        tx.commit()
    }

    /// Drop the live table and rename staging into its place, in one transaction.
    fn swap_in(&mut self, staging: &str, live: &str) -> Result<(), rusqlite::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(&format!(
            r#"DROP TABLE IF EXISTS "{live}";
               ALTER TABLE "{staging}" RENAME TO "{live}";"#
        ))?;
        tx.commit()
    }

    fn drop_table(&self, table: &str) {
        if let Err(e) = self
            .conn
            .execute_batch(&format!(r#"DROP TABLE IF EXISTS "{table}";"#))
        {
            warn!(table, error = %e, "failed to drop staging table");
        }
    }
}

impl ChampionStore for SqliteStore {
    #[instrument(level = "info", skip(self, records), fields(namespace = %self.namespace, records = records.len()))]
    fn replace_collection(&mut self, records: &[ChampionRecord]) -> Result<usize, PersistenceError> {
        let docs = records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| PersistenceError::Encode {
                collection: self.namespace.to_string(),
                source,
            })?;

        let live = self.table();
        // Unique per run so concurrent loads never share a staging table.
        let staging = format!(
            "{}__staging_{}_{}",
            live,
            std::process::id(),
            Utc::now().timestamp_micros()
        );

        if let Err(e) = self.write_staging(&staging, &docs) {
            self.drop_table(&staging);
            return Err(self.write_err()(e));
        }
        debug!(%staging, docs = docs.len(), "staging collection written");

        if let Err(e) = self.swap_in(&staging, &live) {
            self.drop_table(&staging);
            return Err(self.write_err()(e));
        }
        info!(docs = docs.len(), "collection replaced");
        Ok(docs.len())
    }

    fn find_all(&self) -> Result<Vec<ChampionRecord>, PersistenceError> {
        let collection = self.namespace.to_string();
        let read_err = |source: rusqlite::Error| PersistenceError::Read {
            collection: collection.clone(),
            source,
        };

        let live = self.table();
        if !self.table_exists(&live).map_err(read_err)? {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare(&format!(r#"SELECT doc FROM "{live}" ORDER BY _id"#))
            .map_err(read_err)?;
        let docs = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(read_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        docs.iter()
            .map(|doc| {
                serde_json::from_str::<ChampionRecord>(doc).map_err(|source| {
                    PersistenceError::Decode {
                        collection: collection.clone(),
                        source,
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rec(wba: &str, category: &str) -> ChampionRecord {
        ChampionRecord::from_cells(
            [
                wba.to_string(),
                "Vacant".to_string(),
                "c".to_string(),
                "d".to_string(),
                "e".to_string(),
            ],
            category,
        )
    }

    fn staging_tables(store: &SqliteStore) -> usize {
        store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name LIKE '%staging%'",
                [],
                |r| r.get::<_, i64>(0),
            )
            .unwrap() as usize
    }

    #[test]
    fn test_empty_collection_reads_empty() {
        let store = SqliteStore::open_in_memory(Namespace::default()).unwrap();
        assert!(store.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_replace_then_find_all() {
        let mut store = SqliteStore::open_in_memory(Namespace::default()).unwrap();
        let records = vec![rec("a", "Heavyweight"), rec("b", "Flyweight")];
        assert_eq!(store.replace_collection(&records).unwrap(), 2);
        assert_eq!(store.find_all().unwrap(), records);
        assert_eq!(staging_tables(&store), 0);
    }

    #[test]
    fn test_replace_is_idempotent() {
        let mut store = SqliteStore::open_in_memory(Namespace::default()).unwrap();
        let records = vec![rec("a", "Heavyweight"), rec("b", "Flyweight")];
        store.replace_collection(&records).unwrap();
        store.replace_collection(&records).unwrap();
        assert_eq!(store.find_all().unwrap(), records);
    }

    #[test]
    fn test_replace_supersedes_previous_snapshot() {
        let mut store = SqliteStore::open_in_memory(Namespace::default()).unwrap();
        store
            .replace_collection(&[rec("old", "Heavyweight"), rec("old2", "Flyweight")])
            .unwrap();
        store.replace_collection(&[rec("new", "Heavyweight")]).unwrap();
        assert_eq!(store.find_all().unwrap(), vec![rec("new", "Heavyweight")]);

        store.replace_collection(&[]).unwrap();
        assert!(store.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_documents_do_not_expose_identifier() {
        let mut store = SqliteStore::open_in_memory(Namespace::default()).unwrap();
        store.replace_collection(&[rec("a", "Heavyweight")]).unwrap();
        let doc: String = store
            .conn
            .query_row(r#"SELECT doc FROM "world_champions__champions""#, [], |r| {
                r.get(0)
            })
            .unwrap();
        assert!(!doc.contains("_id"));
    }

    #[test]
    fn test_persists_on_disk_and_isolates_namespaces() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("belts.db");
        let uri = format!("sqlite://{}", path.display());
        {
            let mut store = SqliteStore::open(&uri, Namespace::default()).unwrap();
            store.replace_collection(&[rec("a", "Heavyweight")]).unwrap();
        }
        let reopened = SqliteStore::open(path.to_str().unwrap(), Namespace::default()).unwrap();
        assert_eq!(reopened.find_all().unwrap().len(), 1);

        let other = SqliteStore::open(&uri, Namespace::new("world_champions", "archive")).unwrap();
        assert!(other.find_all().unwrap().is_empty());
    }

    fn docs(records: &[ChampionRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect()
    }

    #[test]
    fn test_readers_see_old_snapshot_until_swap() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("belts.db");
        let path = path.to_str().unwrap();

        let mut writer = SqliteStore::open(path, Namespace::default()).unwrap();
        let old = vec![rec("old", "Heavyweight"), rec("old2", "Flyweight")];
        writer.replace_collection(&old).unwrap();

        let reader = SqliteStore::open(path, Namespace::default()).unwrap();
        let live = writer.table();
        let staging = format!("{}__staging_test", live);
        writer
            .write_staging(&staging, &docs(&[rec("new", "Heavyweight")]))
            .unwrap();
        assert_eq!(reader.find_all().unwrap(), old);

        writer.swap_in(&staging, &live).unwrap();
        assert_eq!(reader.find_all().unwrap(), vec![rec("new", "Heavyweight")]);
    }

    #[test]
    fn test_failed_replace_keeps_previous_snapshot() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("belts.db");
        let path = path.to_str().unwrap();

        let mut store = SqliteStore::open(path, Namespace::default()).unwrap();
        let old = vec![rec("old", "Heavyweight")];
        store.replace_collection(&old).unwrap();
        store.conn.busy_timeout(Duration::from_millis(50)).unwrap();

        // Another writer holds the database write lock.
        let blocker = Connection::open(path).unwrap();
        blocker.execute_batch("BEGIN IMMEDIATE;").unwrap();

        let err = store
            .replace_collection(&[rec("new", "Heavyweight")])
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
        assert_eq!(store.find_all().unwrap(), old);

        blocker.execute_batch("ROLLBACK;").unwrap();
        assert_eq!(store.find_all().unwrap(), old);
        assert_eq!(staging_tables(&store), 0);
    }

    #[test]
    fn test_unopenable_path_is_connect_error() {
        let tmp = tempdir().unwrap();
        let bad = tmp.path().join("missing-dir").join("belts.db");
        let err = SqliteStore::open(bad.to_str().unwrap(), Namespace::default()).unwrap_err();
        assert!(matches!(err, PersistenceError::Connect(_)));
    }
}
