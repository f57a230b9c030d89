//! Decision repository.

use chrono::Utc;
use serde::Deserialize;

use huddle_core::audit_detail::StatusChangedDetail;
use huddle_core::entities::{ConnectedTo, Decision, EntityRef};
use huddle_core::enums::{AuditAction, DecisionStatus, EntityType};
use huddle_core::ids::PREFIX_DECISION;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{get_connected_to, get_opt_string, parse_datetime, parse_enum, parse_json_vec};
use crate::repos::{ListQuery, set_connected_to};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::decision::DecisionUpdate;

const SELECT_COLS: &str = "id, title, description, status, created_by, location_id, team_id, \
     member_id, linked_entities, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewDecision {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub connected_to: ConnectedTo,
}

fn row_to_decision(row: &libsql::Row) -> Result<Decision, DatabaseError> {
    Ok(Decision {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        created_by: row.get(4)?,
        connected_to: get_connected_to(row, 5)?,
        linked_entities: parse_json_vec(&row.get::<String>(8)?)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl HuddleService {
    /// Record a new decision in the `proposed` state.
    pub async fn create_decision(
        &self,
        creator_id: &str,
        input: NewDecision,
    ) -> Result<Decision, DatabaseError> {
        if input.title.trim().is_empty() {
            return Err(DatabaseError::Validation("decision title is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_DECISION).await?;
        let ct = &input.connected_to;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO decisions ({SELECT_COLS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, '[]', ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    input.title.as_str(),
                    input.description.as_deref(),
                    DecisionStatus::Proposed.as_str(),
                    creator_id,
                    ct.location_id.as_deref(),
                    ct.team_id.as_deref(),
                    ct.member_id.as_deref(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        self.record_audit(
            Some(creator_id),
            EntityType::Decision,
            &id,
            AuditAction::Created,
            None::<&()>,
        )
        .await?;

        Ok(Decision {
            id,
            title: input.title,
            description: input.description,
            status: DecisionStatus::Proposed,
            created_by: creator_id.to_string(),
            connected_to: input.connected_to,
            linked_entities: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_decision(&self, id: &str) -> Result<Decision, DatabaseError> {
        self.fetch_by_id("decisions", SELECT_COLS, id, row_to_decision)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Decision, id))
    }

    /// Update a decision. Status changes must follow the decision lifecycle.
    pub async fn update_decision(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: DecisionUpdate,
    ) -> Result<Decision, DatabaseError> {
        let current = self.get_decision(id).await?;

        let mut set = SetClause::new();
        if let Some(ref title) = update.title {
            set.set("title", title.clone());
        }
        if let Some(ref description) = update.description {
            set.set_nullable("description", description.clone());
        }
        let status_change = update.status.filter(|s| *s != current.status);
        if let Some(next) = status_change {
            if !current.status.can_transition_to(next) {
                return Err(DatabaseError::InvalidState(format!(
                    "decision cannot move from {} to {next}",
                    current.status
                )));
            }
            set.set("status", next.as_str());
        }
        if let Some(ref connected_to) = update.connected_to {
            set_connected_to(&mut set, connected_to);
        }
        if set.is_empty() {
            return Ok(current);
        }

        let (sql, params) = set.into_update("decisions", id, Utc::now());
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        if let Some(next) = status_change {
            let detail = StatusChangedDetail {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            };
            self.record_audit(
                actor_id,
                EntityType::Decision,
                id,
                AuditAction::StatusChanged,
                Some(&detail),
            )
            .await?;
        } else {
            self.record_audit(actor_id, EntityType::Decision, id, AuditAction::Updated, Some(&update))
                .await?;
        }
        self.get_decision(id).await
    }

    pub async fn delete_decision(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_decision(id).await?;
        let tx = self.db().begin().await?;
        self.delete_linkable_on(&tx, actor_id, &EntityRef::new(EntityType::Decision, id))
            .await?;
        tx.commit().await
    }

    pub async fn list_decisions(&self, query: &ListQuery) -> Result<Page<Decision>, DatabaseError> {
        let filter = query.document_filter("created_by");
        self.fetch_page(
            "decisions",
            SELECT_COLS,
            &filter,
            "created_at DESC, rowid DESC",
            query.page,
            query.limit,
            row_to_decision,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::test_service;
    use crate::updates::decision::DecisionUpdateBuilder;

    fn new_decision(title: &str) -> NewDecision {
        NewDecision {
            title: title.into(),
            description: None,
            connected_to: ConnectedTo::default(),
        }
    }

    #[tokio::test]
    async fn lifecycle_is_enforced() {
        let svc = test_service().await;
        let d = svc
            .create_decision("mem-00000001", new_decision("Ship on Fridays"))
            .await
            .unwrap();
        assert_eq!(d.status, DecisionStatus::Proposed);

        let approved = svc
            .update_decision(
                None,
                &d.id,
                DecisionUpdateBuilder::new().status(DecisionStatus::Approved).build(),
            )
            .await
            .unwrap();
        assert_eq!(approved.status, DecisionStatus::Approved);

        let err = svc
            .update_decision(
                None,
                &d.id,
                DecisionUpdateBuilder::new().status(DecisionStatus::Rejected).build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::StatusChanged),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(
            audit[0].detail,
            Some(serde_json::json!({"from": "proposed", "to": "approved"}))
        );
    }

    #[tokio::test]
    async fn delete_detaches_connections() {
        let svc = test_service().await;
        let a = svc.create_decision("mem-00000001", new_decision("A")).await.unwrap();
        let b = svc.create_decision("mem-00000001", new_decision("B")).await.unwrap();
        let a_ref = EntityRef::new(EntityType::Decision, a.id.clone());
        let b_ref = EntityRef::new(EntityType::Decision, b.id.clone());
        svc.create_connection(None, &a_ref, &b_ref).await.unwrap();

        svc.delete_decision(None, &a.id).await.unwrap();
        assert!(svc.get_decision(&b.id).await.unwrap().linked_entities.is_empty());
        assert!(matches!(
            svc.get_decision(&a.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
