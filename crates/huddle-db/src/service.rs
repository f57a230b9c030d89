//! Service layer orchestrating database mutations with audit and notifications.
//!
//! `HuddleService` wraps `HuddleDb`. All repo methods are implemented as
//! `impl HuddleService` blocks under [`crate::repos`].

use crate::HuddleDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with the audit trail.
///
/// Every mutation method follows this protocol:
/// 1. Validate input and load the documents it touches
/// 2. Execute SQL (inside a transaction when more than one document changes)
/// 3. Append an audit entry
/// 4. Raise notifications for the members affected
pub struct HuddleService {
    db: HuddleDb,
}

impl HuddleService {
    /// Open a local database and wrap it in a service.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = HuddleDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Wrap an existing `HuddleDb`.
    #[must_use]
    pub const fn from_db(db: HuddleDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &HuddleDb {
        &self.db
    }
}
