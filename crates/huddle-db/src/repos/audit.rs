//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation. Supports dynamic
//! filtering by entity, action, and actor.

use chrono::Utc;
use serde::Serialize;

use huddle_core::entities::AuditEntry;
use huddle_core::enums::{AuditAction, EntityType};
use huddle_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::HuddleService;

const INSERT_AUDIT: &str = "INSERT INTO audit_trail (id, actor_id, entity_type, entity_id, action, detail, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub limit: Option<u32>,
}

fn audit_params(entry: &AuditEntry) -> Vec<libsql::Value> {
    vec![
        entry.id.clone().into(),
        entry
            .actor_id
            .clone()
            .map_or(libsql::Value::Null, Into::into),
        entry.entity_type.as_str().into(),
        entry.entity_id.clone().into(),
        entry.action.as_str().into(),
        entry
            .detail
            .as_ref()
            .map_or(libsql::Value::Null, |d| d.to_string().into()),
        entry.created_at.to_rfc3339().into(),
    ]
}

/// Append an audit entry on an already-open connection or transaction.
pub(crate) async fn append_audit_on(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    conn.execute(INSERT_AUDIT, libsql::params_from_iter(audit_params(entry)))
        .await?;
    Ok(())
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        actor_id: get_opt_string(row, 1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get::<String>(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl HuddleService {
    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        self.db()
            .execute(INSERT_AUDIT, libsql::params_from_iter(audit_params(entry)))
            .await?;
        Ok(())
    }

    /// Build an audit entry with a fresh ID. Callers append it themselves,
    /// either directly or inside a transaction.
    pub(crate) async fn audit_entry(
        &self,
        actor_id: Option<&str>,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<&impl Serialize>,
    ) -> Result<AuditEntry, DatabaseError> {
        Ok(AuditEntry {
            id: self.db().generate_id(PREFIX_AUDIT).await?,
            actor_id: actor_id.map(String::from),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail: detail.map(serde_json::to_value).transpose()?,
            created_at: Utc::now(),
        })
    }

    /// Build and append an audit entry in one step.
    pub(crate) async fn record_audit(
        &self,
        actor_id: Option<&str>,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<&impl Serialize>,
    ) -> Result<(), DatabaseError> {
        let entry = self
            .audit_entry(actor_id, entity_type, entity_id, action, detail)
            .await?;
        self.append_audit(&entry).await
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor_id {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn record_and_filter() {
        let svc = test_service().await;
        svc.record_audit(
            Some("mem-00000001"),
            EntityType::Note,
            "not-00000001",
            AuditAction::Created,
            None::<&()>,
        )
        .await
        .unwrap();
        svc.record_audit(
            None,
            EntityType::Todo,
            "tdo-00000001",
            AuditAction::Deleted,
            Some(&serde_json::json!({"reason": "cleanup"})),
        )
        .await
        .unwrap();

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let notes = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Note),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].actor_id.as_deref(), Some("mem-00000001"));

        let deleted = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Deleted),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(deleted[0].actor_id, None);
        assert_eq!(
            deleted[0].detail,
            Some(serde_json::json!({"reason": "cleanup"}))
        );
    }
}
