//! Team repository.

use chrono::Utc;

use huddle_core::entities::Team;
use huddle_core::enums::{AuditAction, EntityType};
use huddle_core::ids::PREFIX_TEAM;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{WhereBuilder, get_opt_string, parse_datetime};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::team::TeamUpdate;

const SELECT_COLS: &str = "id, name, description, location_id, created_at, updated_at";

fn row_to_team(row: &libsql::Row) -> Result<Team, DatabaseError> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        location_id: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl HuddleService {
    pub async fn create_team(
        &self,
        actor_id: Option<&str>,
        name: &str,
        description: Option<&str>,
        location_id: Option<&str>,
    ) -> Result<Team, DatabaseError> {
        if name.trim().is_empty() {
            return Err(DatabaseError::Validation("team name is required".into()));
        }
        if let Some(location_id) = location_id {
            self.get_location(location_id).await?;
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_TEAM).await?;

        self.db()
            .execute(
                &format!("INSERT INTO teams ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![
                    id.as_str(),
                    name,
                    description,
                    location_id,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.record_audit(actor_id, EntityType::Team, &id, AuditAction::Created, None::<&()>)
            .await?;
        tracing::debug!(team_id = %id, "team created");

        Ok(Team {
            id,
            name: name.to_string(),
            description: description.map(String::from),
            location_id: location_id.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_team(&self, id: &str) -> Result<Team, DatabaseError> {
        self.fetch_by_id("teams", SELECT_COLS, id, row_to_team)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Team, id))
    }

    pub async fn update_team(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: TeamUpdate,
    ) -> Result<Team, DatabaseError> {
        self.get_team(id).await?;

        let mut set = SetClause::new();
        if let Some(ref name) = update.name {
            set.set("name", name.clone());
        }
        if let Some(ref description) = update.description {
            set.set_nullable("description", description.clone());
        }
        if let Some(ref location_id) = update.location_id {
            if let Some(location_id) = location_id {
                self.get_location(location_id).await?;
            }
            set.set_nullable("location_id", location_id.clone());
        }
        if set.is_empty() {
            return self.get_team(id).await;
        }

        let (sql, params) = set.into_update("teams", id, Utc::now());
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit(actor_id, EntityType::Team, id, AuditAction::Updated, Some(&update))
            .await?;
        self.get_team(id).await
    }

    pub async fn delete_team(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_team(id).await?;
        self.db()
            .execute("DELETE FROM teams WHERE id = ?1", [id])
            .await?;
        self.record_audit(actor_id, EntityType::Team, id, AuditAction::Deleted, None::<&()>)
            .await?;
        tracing::debug!(team_id = %id, "team deleted");
        Ok(())
    }

    /// List teams, optionally narrowed to one location.
    pub async fn list_teams(
        &self,
        location_id: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Page<Team>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.eq_opt("location_id", location_id);
        self.fetch_page("teams", SELECT_COLS, &filter, "name", page, limit, row_to_team)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_org, test_service};
    use crate::updates::team::TeamUpdateBuilder;

    #[tokio::test]
    async fn create_team_requires_existing_location() {
        let svc = test_service().await;
        let err = svc
            .create_team(None, "Ghost", None, Some("loc-00000000"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound {
                entity_type: EntityType::Location,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn update_and_filter_by_location() {
        let svc = test_service().await;
        let (loc, team) = seed_org(&svc).await;
        svc.create_team(None, "Floating", None, None).await.unwrap();

        let update = TeamUpdateBuilder::new()
            .description(Some("Core services".into()))
            .build();
        let updated = svc.update_team(None, &team.id, update).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("Core services"));

        let at_loc = svc.list_teams(Some(&loc.id), 1, 20).await.unwrap();
        assert_eq!(at_loc.items.len(), 1);
        let all = svc.list_teams(None, 1, 20).await.unwrap();
        assert_eq!(all.pagination.total, 2);
    }

    #[tokio::test]
    async fn delete_team_writes_audit() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        svc.delete_team(Some("mem-admin001"), &team.id).await.unwrap();

        let audit = svc
            .query_audit(&crate::repos::audit::AuditFilter {
                entity_id: Some(team.id.clone()),
                action: Some(AuditAction::Deleted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].actor_id.as_deref(), Some("mem-admin001"));
    }
}
