//! # huddle-db
//!
//! libSQL document store for Huddle.
//!
//! Holds every document (org structure, notes, todos, decisions, events,
//! channels, messages, notifications) plus the append-only audit trail.
//! Mirrored `linked_entities` arrays are maintained by the connection service
//! in [`repos::link`], always inside a single transaction.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29).

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::ops::Deref;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle for all Huddle state operations.
///
/// Reads go straight to the shared connection. Writes are serialized through
/// `write_lock` so a statement issued by one request can never land inside a
/// transaction opened by another.
pub struct HuddleDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    write_lock: Mutex<()>,
}

impl HuddleDb {
    /// Open a local database at the given path. `":memory:"` opens a
    /// throwaway in-memory database.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let huddle_db = Self {
            db,
            conn,
            write_lock: Mutex::new(()),
        };
        huddle_db.run_migrations().await?;
        Ok(huddle_db)
    }

    /// Access the underlying libSQL connection for reads.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Execute a single write statement under the write lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the statement fails.
    pub async fn execute(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<u64, DatabaseError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.conn.execute(sql, params).await?)
    }

    /// Begin a write transaction. The write lock is held until the returned
    /// [`WriteTx`] is committed or dropped; dropping without commit rolls back.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails.
    pub async fn begin(&self) -> Result<WriteTx<'_>, DatabaseError> {
        let guard = self.write_lock.lock().await;
        let tx = self.conn.transaction().await?;
        Ok(WriteTx { tx, _guard: guard })
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"not-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

/// An open write transaction holding the database write lock.
///
/// Derefs to [`libsql::Connection`], so `execute` and `query` run inside the
/// transaction.
pub struct WriteTx<'a> {
    tx: libsql::Transaction,
    _guard: MutexGuard<'a, ()>,
}

impl WriteTx<'_> {
    /// Commit the transaction and release the write lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `COMMIT` fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl Deref for WriteTx<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> HuddleDb {
        HuddleDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "locations",
            "teams",
            "members",
            "notes",
            "todos",
            "decisions",
            "events",
            "channels",
            "messages",
            "notifications",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("not").await.unwrap();
        assert!(id.starts_with("not-"), "ID should start with 'not-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in huddle_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let db = test_db().await;
        {
            let tx = db.begin().await.unwrap();
            tx.execute(
                "INSERT INTO locations (id, name) VALUES ('loc-00000001', 'Porto')",
                (),
            )
            .await
            .unwrap();
        }
        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM locations", ())
            .await
            .unwrap();
        let count = rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn committed_transaction_persists() {
        let db = test_db().await;
        let tx = db.begin().await.unwrap();
        tx.execute(
            "INSERT INTO locations (id, name) VALUES ('loc-00000001', 'Porto')",
            (),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        // The lock is released after commit, so plain writes proceed.
        db.execute(
            "UPDATE locations SET name = 'Braga' WHERE id = 'loc-00000001'",
            (),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn email_is_unique() {
        let db = test_db().await;
        db.execute(
            "INSERT INTO members (id, name, email) VALUES ('mem-1', 'A', 'a@x.io')",
            (),
        )
        .await
        .unwrap();
        let dup = db
            .execute(
                "INSERT INTO members (id, name, email) VALUES ('mem-2', 'B', 'a@x.io')",
                (),
            )
            .await;
        assert!(dup.is_err());
    }
}
