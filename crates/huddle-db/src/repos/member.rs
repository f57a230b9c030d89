//! Member repository.

use chrono::Utc;
use serde::Deserialize;

use huddle_core::entities::Member;
use huddle_core::enums::{AuditAction, EntityType, Role};
use huddle_core::ids::PREFIX_MEMBER;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{WhereBuilder, get_opt_string, parse_datetime, parse_enum};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::member::MemberUpdate;

const SELECT_COLS: &str =
    "id, name, email, role, team_id, location_id, created_at, updated_at";

/// Input for [`HuddleService::create_member`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
}

fn row_to_member(row: &libsql::Row) -> Result<Member, DatabaseError> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        team_id: get_opt_string(row, 4)?,
        location_id: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn validate_email(email: &str) -> Result<(), DatabaseError> {
    let ok = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if ok {
        Ok(())
    } else {
        Err(DatabaseError::Validation(format!("invalid email '{email}'")))
    }
}

impl HuddleService {
    /// Create a member. A member placed on a team without an explicit
    /// location inherits the team's location.
    pub async fn create_member(
        &self,
        actor_id: Option<&str>,
        input: NewMember,
    ) -> Result<Member, DatabaseError> {
        if input.name.trim().is_empty() {
            return Err(DatabaseError::Validation("member name is required".into()));
        }
        validate_email(&input.email)?;

        let mut location_id = input.location_id.clone();
        if let Some(ref team_id) = input.team_id {
            let team = self.get_team(team_id).await?;
            if location_id.is_none() {
                location_id = team.location_id;
            }
        }
        if let Some(ref location_id) = location_id {
            self.get_location(location_id).await?;
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_MEMBER).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO members ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    input.name.as_str(),
                    input.email.as_str(),
                    input.role.as_str(),
                    input.team_id.as_deref(),
                    location_id.as_deref(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| {
                DatabaseError::from_unique(e, &format!("member with email {}", input.email))
            })?;

        self.record_audit(actor_id, EntityType::Member, &id, AuditAction::Created, None::<&()>)
            .await?;
        tracing::debug!(member_id = %id, role = %input.role, "member created");

        Ok(Member {
            id,
            name: input.name,
            email: input.email,
            role: input.role,
            team_id: input.team_id,
            location_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_member(&self, id: &str) -> Result<Member, DatabaseError> {
        self.fetch_by_id("members", SELECT_COLS, id, row_to_member)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Member, id))
    }

    /// Look up a member without treating absence as an error. Used for
    /// request authentication.
    pub async fn find_member(&self, id: &str) -> Result<Option<Member>, DatabaseError> {
        self.fetch_by_id("members", SELECT_COLS, id, row_to_member)
            .await
    }

    pub async fn update_member(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: MemberUpdate,
    ) -> Result<Member, DatabaseError> {
        self.get_member(id).await?;

        let mut set = SetClause::new();
        if let Some(ref name) = update.name {
            set.set("name", name.clone());
        }
        if let Some(ref email) = update.email {
            validate_email(email)?;
            set.set("email", email.clone());
        }
        if let Some(role) = update.role {
            set.set("role", role.as_str());
        }
        if let Some(ref team_id) = update.team_id {
            if let Some(team_id) = team_id {
                self.get_team(team_id).await?;
            }
            set.set_nullable("team_id", team_id.clone());
        }
        if let Some(ref location_id) = update.location_id {
            if let Some(location_id) = location_id {
                self.get_location(location_id).await?;
            }
            set.set_nullable("location_id", location_id.clone());
        }
        if set.is_empty() {
            return self.get_member(id).await;
        }

        let (sql, params) = set.into_update("members", id, Utc::now());
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| DatabaseError::from_unique(e, "member with this email"))?;

        self.record_audit(actor_id, EntityType::Member, id, AuditAction::Updated, Some(&update))
            .await?;
        self.get_member(id).await
    }

    pub async fn delete_member(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_member(id).await?;
        self.db()
            .execute("DELETE FROM members WHERE id = ?1", [id])
            .await?;
        self.record_audit(actor_id, EntityType::Member, id, AuditAction::Deleted, None::<&()>)
            .await?;
        tracing::debug!(member_id = %id, "member deleted");
        Ok(())
    }

    pub async fn list_members(
        &self,
        team_id: Option<&str>,
        location_id: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Page<Member>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.eq_opt("team_id", team_id);
        filter.eq_opt("location_id", location_id);
        self.fetch_page("members", SELECT_COLS, &filter, "name", page, limit, row_to_member)
            .await
    }

    /// Every member as `(id, name, email)`, for mention resolution.
    pub(crate) async fn member_labels(&self) -> Result<Vec<(String, String, String)>, DatabaseError> {
        self.fetch_all(
            "SELECT id, name, email FROM members ORDER BY created_at, rowid",
            Vec::new(),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_member, seed_org, test_service};
    use crate::updates::member::MemberUpdateBuilder;

    #[tokio::test]
    async fn member_inherits_team_location() {
        let svc = test_service().await;
        let (loc, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana Lima", Role::Manager, &team).await;
        assert_eq!(ana.location_id.as_deref(), Some(loc.id.as_str()));
        assert_eq!(svc.get_member(&ana.id).await.unwrap(), ana);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        seed_member(&svc, "Ana", Role::Member, &team).await;
        let err = svc
            .create_member(
                None,
                NewMember {
                    name: "Other Ana".into(),
                    email: "ana@example.com".into(),
                    role: Role::Member,
                    team_id: None,
                    location_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)), "{err}");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_member(
                None,
                NewMember {
                    name: "Nobody".into(),
                    email: "nobody".into(),
                    role: Role::Member,
                    team_id: None,
                    location_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn promote_and_find() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let bob = seed_member(&svc, "Bob", Role::Member, &team).await;

        let update = MemberUpdateBuilder::new().role(Role::Admin).build();
        let promoted = svc.update_member(None, &bob.id, update).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);

        assert!(svc.find_member("mem-missing1").await.unwrap().is_none());
        let list = svc.list_members(Some(&team.id), None, 1, 10).await.unwrap();
        assert_eq!(list.items.len(), 1);
    }
}
