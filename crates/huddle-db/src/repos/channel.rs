//! Channel repository.

use chrono::Utc;
use serde::Deserialize;

use huddle_core::entities::{Channel, ConnectedTo, EntityRef};
use huddle_core::enums::{AuditAction, ChannelType, EntityType};
use huddle_core::ids::PREFIX_CHANNEL;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_connected_to, get_opt_string, parse_datetime, parse_enum, parse_json_vec,
    to_json_text,
};
use crate::repos::{ListQuery, set_connected_to};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::channel::ChannelUpdate;

const SELECT_COLS: &str = "id, name, description, channel_type, location_id, team_id, member_id, \
     members, linked_entities, is_archived, created_by, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewChannel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub connected_to: ConnectedTo,
    #[serde(default)]
    pub members: Vec<String>,
}

fn row_to_channel(row: &libsql::Row) -> Result<Channel, DatabaseError> {
    Ok(Channel {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        channel_type: parse_enum(&row.get::<String>(3)?)?,
        connected_to: get_connected_to(row, 4)?,
        members: parse_json_vec(&row.get::<String>(7)?)?,
        linked_entities: parse_json_vec(&row.get::<String>(8)?)?,
        is_archived: get_bool(row, 9)?,
        created_by: row.get(10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

impl HuddleService {
    /// Every id must be a member; a direct channel has exactly two.
    async fn check_channel_members(
        &self,
        channel_type: ChannelType,
        members: &[String],
    ) -> Result<(), DatabaseError> {
        for member_id in members {
            self.get_member(member_id).await?;
        }
        if channel_type == ChannelType::Direct && members.len() != 2 {
            return Err(DatabaseError::Validation(
                "a direct channel has exactly two members".into(),
            ));
        }
        Ok(())
    }

    /// Create a channel. The creator is always a member.
    pub async fn create_channel(
        &self,
        creator_id: &str,
        input: NewChannel,
    ) -> Result<Channel, DatabaseError> {
        if input.name.trim().is_empty() {
            return Err(DatabaseError::Validation("channel name is required".into()));
        }
        let mut members = input.members;
        if !members.iter().any(|m| m == creator_id) {
            members.insert(0, creator_id.to_string());
        }
        members.dedup();
        self.check_channel_members(input.channel_type, &members)
            .await?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CHANNEL).await?;
        let ct = &input.connected_to;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO channels ({SELECT_COLS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, '[]', 0, ?9, ?10, ?11)"
                ),
                libsql::params![
                    id.as_str(),
                    input.name.as_str(),
                    input.description.as_deref(),
                    input.channel_type.as_str(),
                    ct.location_id.as_deref(),
                    ct.team_id.as_deref(),
                    ct.member_id.as_deref(),
                    to_json_text(&members)?,
                    creator_id,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        self.record_audit(
            Some(creator_id),
            EntityType::Channel,
            &id,
            AuditAction::Created,
            None::<&()>,
        )
        .await?;
        tracing::debug!(channel_id = %id, channel_type = %input.channel_type, "channel created");

        Ok(Channel {
            id,
            name: input.name,
            description: input.description,
            channel_type: input.channel_type,
            connected_to: input.connected_to,
            members,
            linked_entities: Vec::new(),
            is_archived: false,
            created_by: creator_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_channel(&self, id: &str) -> Result<Channel, DatabaseError> {
        self.fetch_by_id("channels", SELECT_COLS, id, row_to_channel)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Channel, id))
    }

    pub async fn update_channel(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: ChannelUpdate,
    ) -> Result<Channel, DatabaseError> {
        let current = self.get_channel(id).await?;

        let mut set = SetClause::new();
        if let Some(ref name) = update.name {
            if name.trim().is_empty() {
                return Err(DatabaseError::Validation("channel name is required".into()));
            }
            set.set("name", name.clone());
        }
        if let Some(ref description) = update.description {
            set.set_nullable("description", description.clone());
        }
        if update.channel_type.is_some() || update.members.is_some() {
            let channel_type = update.channel_type.unwrap_or(current.channel_type);
            let members = update.members.as_ref().unwrap_or(&current.members);
            self.check_channel_members(channel_type, members).await?;
            set.set("channel_type", channel_type.as_str());
            set.set("members", to_json_text(members)?);
        }
        if let Some(is_archived) = update.is_archived {
            set.set("is_archived", i64::from(is_archived));
        }
        if let Some(ref connected_to) = update.connected_to {
            set_connected_to(&mut set, connected_to);
        }
        if set.is_empty() {
            return Ok(current);
        }

        let (sql, params) = set.into_update("channels", id, Utc::now());
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        self.record_audit(actor_id, EntityType::Channel, id, AuditAction::Updated, Some(&update))
            .await?;
        self.get_channel(id).await
    }

    /// Delete a channel with its messages, detaching it from every
    /// connected document.
    pub async fn delete_channel(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_channel(id).await?;
        let tx = self.db().begin().await?;
        self.delete_linkable_on(&tx, actor_id, &EntityRef::new(EntityType::Channel, id))
            .await?;
        tx.commit().await
    }

    pub async fn list_channels(&self, query: &ListQuery) -> Result<Page<Channel>, DatabaseError> {
        let filter = query.document_filter("created_by");
        self.fetch_page(
            "channels",
            SELECT_COLS,
            &filter,
            "name",
            query.page,
            query.limit,
            row_to_channel,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_member, seed_org, team_scope, test_service};
    use crate::updates::channel::ChannelUpdateBuilder;
    use huddle_core::enums::Role;
    use huddle_core::permissions::ScopeFilter;

    fn new_channel(name: &str, channel_type: ChannelType, members: Vec<String>) -> NewChannel {
        NewChannel {
            name: name.into(),
            description: None,
            channel_type,
            connected_to: ConnectedTo::default(),
            members,
        }
    }

    #[tokio::test]
    async fn creator_joins_and_direct_needs_two() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana", Role::Member, &team).await;
        let bob = seed_member(&svc, "Bob", Role::Member, &team).await;

        let general = svc
            .create_channel(&ana.id, new_channel("general", ChannelType::Public, vec![]))
            .await
            .unwrap();
        assert_eq!(general.members, vec![ana.id.clone()]);

        let err = svc
            .create_channel(&ana.id, new_channel("dm", ChannelType::Direct, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        let dm = svc
            .create_channel(&ana.id, new_channel("dm", ChannelType::Direct, vec![bob.id.clone()]))
            .await
            .unwrap();
        assert_eq!(dm.members.len(), 2);
    }

    #[tokio::test]
    async fn unknown_member_is_not_found() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana", Role::Member, &team).await;
        let err = svc
            .create_channel(
                &ana.id,
                new_channel("x", ChannelType::Private, vec!["mem-00000404".into()]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn archive_and_list_by_scope() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana", Role::Member, &team).await;
        let mut input = new_channel("platform", ChannelType::Public, vec![]);
        input.connected_to = team_scope(&team);
        let channel = svc.create_channel(&ana.id, input).await.unwrap();
        svc.create_channel(&ana.id, new_channel("random", ChannelType::Public, vec![]))
            .await
            .unwrap();

        let archived = svc
            .update_channel(None, &channel.id, ChannelUpdateBuilder::new().is_archived(true).build())
            .await
            .unwrap();
        assert!(archived.is_archived);

        let query = ListQuery {
            scope: ScopeFilter::Restricted {
                member_id: "mem-someone".into(),
                team_id: Some(team.id.clone()),
                location_id: None,
            },
            ..ListQuery::default()
        };
        let page = svc.list_channels(&query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "platform");
    }

    #[tokio::test]
    async fn delete_cascades_messages() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana", Role::Member, &team).await;
        let channel = svc
            .create_channel(&ana.id, new_channel("general", ChannelType::Public, vec![]))
            .await
            .unwrap();
        let posted = svc.create_message(&ana.id, &channel.id, "hello").await.unwrap();

        svc.delete_channel(Some(&ana.id), &channel.id).await.unwrap();
        assert!(matches!(
            svc.get_message(&posted.message.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
