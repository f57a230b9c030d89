//! Event repository.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use huddle_core::entities::{ConnectedTo, EntityRef, Event};
use huddle_core::enums::{AuditAction, EntityType};
use huddle_core::ids::PREFIX_EVENT;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{
    get_connected_to, get_opt_string, parse_datetime, parse_json_vec, parse_optional_datetime,
};
use crate::repos::{ListQuery, set_connected_to};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::event::EventUpdate;

const SELECT_COLS: &str = "id, title, description, starts_at, ends_at, venue, created_by, \
     location_id, team_id, member_id, linked_entities, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub connected_to: ConnectedTo,
}

fn row_to_event(row: &libsql::Row) -> Result<Event, DatabaseError> {
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        starts_at: parse_datetime(&row.get::<String>(3)?)?,
        ends_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        venue: get_opt_string(row, 5)?,
        created_by: row.get(6)?,
        connected_to: get_connected_to(row, 7)?,
        linked_entities: parse_json_vec(&row.get::<String>(10)?)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

fn check_window(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> Result<(), DatabaseError> {
    match ends_at {
        Some(ends_at) if ends_at < starts_at => Err(DatabaseError::Validation(
            "event cannot end before it starts".into(),
        )),
        _ => Ok(()),
    }
}

impl HuddleService {
    pub async fn create_event(&self, creator_id: &str, input: NewEvent) -> Result<Event, DatabaseError> {
        if input.title.trim().is_empty() {
            return Err(DatabaseError::Validation("event title is required".into()));
        }
        check_window(input.starts_at, input.ends_at)?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_EVENT).await?;
        let ct = &input.connected_to;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO events ({SELECT_COLS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, '[]', ?11, ?12)"
                ),
                libsql::params![
                    id.as_str(),
                    input.title.as_str(),
                    input.description.as_deref(),
                    input.starts_at.to_rfc3339(),
                    input.ends_at.map(|t| t.to_rfc3339()),
                    input.venue.as_deref(),
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
            EntityType::Event,
            &id,
            AuditAction::Created,
            None::<&()>,
        )
        .await?;

        Ok(Event {
            id,
            title: input.title,
            description: input.description,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            venue: input.venue,
            created_by: creator_id.to_string(),
            connected_to: input.connected_to,
            linked_entities: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, DatabaseError> {
        self.fetch_by_id("events", SELECT_COLS, id, row_to_event)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Event, id))
    }

    pub async fn update_event(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: EventUpdate,
    ) -> Result<Event, DatabaseError> {
        let current = self.get_event(id).await?;
        check_window(
            update.starts_at.unwrap_or(current.starts_at),
            update.ends_at.unwrap_or(current.ends_at),
        )?;

        let mut set = SetClause::new();
        if let Some(ref title) = update.title {
            set.set("title", title.clone());
        }
        if let Some(ref description) = update.description {
            set.set_nullable("description", description.clone());
        }
        if let Some(starts_at) = update.starts_at {
            set.set("starts_at", starts_at.to_rfc3339());
        }
        if let Some(ends_at) = update.ends_at {
            set.set_nullable("ends_at", ends_at.map(|t| t.to_rfc3339()));
        }
        if let Some(ref venue) = update.venue {
            set.set_nullable("venue", venue.clone());
        }
        if let Some(ref connected_to) = update.connected_to {
            set_connected_to(&mut set, connected_to);
        }
        if set.is_empty() {
            return Ok(current);
        }

        let (sql, params) = set.into_update("events", id, Utc::now());
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        self.record_audit(actor_id, EntityType::Event, id, AuditAction::Updated, Some(&update))
            .await?;
        self.get_event(id).await
    }

    pub async fn delete_event(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_event(id).await?;
        let tx = self.db().begin().await?;
        self.delete_linkable_on(&tx, actor_id, &EntityRef::new(EntityType::Event, id))
            .await?;
        tx.commit().await
    }

    /// Events in start order.
    pub async fn list_events(&self, query: &ListQuery) -> Result<Page<Event>, DatabaseError> {
        let filter = query.document_filter("created_by");
        self.fetch_page(
            "events",
            SELECT_COLS,
            &filter,
            "starts_at, rowid",
            query.page,
            query.limit,
            row_to_event,
        )
        .await
    }
}
