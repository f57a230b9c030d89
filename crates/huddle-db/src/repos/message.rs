//! Message repository.
//!
//! `@mentions` and `#hashtags` are resolved when a message is written and the
//! results are stored on the row, so reads never re-parse.

use chrono::Utc;
use serde::Serialize;

use huddle_core::entities::{EntityRef, Message};
use huddle_core::enums::{AuditAction, EntityType, NotificationKind};
use huddle_core::ids::PREFIX_MESSAGE;
use huddle_core::responses::Page;
use huddle_parser::{Candidate, CandidateSet, ParsedMessage, parse_message};

use crate::error::DatabaseError;
use crate::helpers::{
    WhereBuilder, get_bool, get_opt_string, parse_datetime, parse_json_vec, to_json_text,
};
use crate::service::HuddleService;

const SELECT_COLS: &str = "id, channel_id, member_id, text, mentioned_members, linked_note, \
     linked_todo, linked_event, is_system, created_at, updated_at";

/// A written message plus what its text resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct MessageWrite {
    #[serde(flatten)]
    pub message: Message,
    /// Every resolved reference, including channels and decisions, which
    /// have no dedicated column.
    pub references: Vec<EntityRef>,
    pub unresolved: Vec<String>,
}

fn row_to_message(row: &libsql::Row) -> Result<Message, DatabaseError> {
    Ok(Message {
        id: row.get(0)?,
        channel_id: row.get(1)?,
        member_id: row.get(2)?,
        text: row.get(3)?,
        mentioned_members: parse_json_vec(&row.get::<String>(4)?)?,
        linked_note: get_opt_string(row, 5)?,
        linked_todo: get_opt_string(row, 6)?,
        linked_event: get_opt_string(row, 7)?,
        is_system: get_bool(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn id_title(row: &libsql::Row) -> Result<Candidate, DatabaseError> {
    Ok(Candidate::new(row.get::<String>(0)?, row.get::<String>(1)?))
}

fn require_text(text: &str) -> Result<(), DatabaseError> {
    if text.trim().is_empty() {
        Err(DatabaseError::Validation("message text is required".into()))
    } else {
        Ok(())
    }
}

impl HuddleService {
    /// Members as mention candidates, matched by display name and by the
    /// local part of their email.
    pub(crate) async fn member_candidates(&self) -> Result<Vec<Candidate>, DatabaseError> {
        let mut members = Vec::new();
        for (id, name, email) in self.member_labels().await? {
            let local = email.split('@').next().unwrap_or_default().to_string();
            members.push(Candidate::new(id.clone(), name));
            members.push(Candidate::new(id, local));
        }
        Ok(members)
    }

    /// Current candidate lists for mention resolution.
    pub async fn load_candidates(&self) -> Result<CandidateSet, DatabaseError> {
        let members = self.member_candidates().await?;
        let titles = |table: &str, column: &str| {
            format!("SELECT id, {column} FROM {table} ORDER BY created_at, rowid")
        };
        Ok(CandidateSet {
            members,
            notes: self.fetch_all(&titles("notes", "title"), Vec::new(), id_title).await?,
            todos: self.fetch_all(&titles("todos", "title"), Vec::new(), id_title).await?,
            events: self.fetch_all(&titles("events", "title"), Vec::new(), id_title).await?,
            channels: self.fetch_all(&titles("channels", "name"), Vec::new(), id_title).await?,
            decisions: self
                .fetch_all(&titles("decisions", "title"), Vec::new(), id_title)
                .await?,
        })
    }

    async fn parse_text(&self, text: &str) -> Result<ParsedMessage, DatabaseError> {
        let candidates = self.load_candidates().await?;
        Ok(parse_message(text, &candidates))
    }

    /// Post a message to a channel as `author_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown channel, `InvalidState` if it is archived,
    /// `Validation` for empty text.
    pub async fn create_message(
        &self,
        author_id: &str,
        channel_id: &str,
        text: &str,
    ) -> Result<MessageWrite, DatabaseError> {
        require_text(text)?;
        let channel = self.get_channel(channel_id).await?;
        if channel.is_archived {
            return Err(DatabaseError::InvalidState(format!(
                "channel {channel_id} is archived"
            )));
        }

        let parsed = self.parse_text(text).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_MESSAGE).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO messages ({SELECT_COLS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    channel_id,
                    author_id,
                    text,
                    to_json_text(&parsed.mentioned_members)?,
                    parsed.linked_note.as_deref(),
                    parsed.linked_todo.as_deref(),
                    parsed.linked_event.as_deref(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        self.record_audit(
            Some(author_id),
            EntityType::Message,
            &id,
            AuditAction::Created,
            None::<&()>,
        )
        .await?;

        let message = Message {
            id,
            channel_id: channel_id.to_string(),
            member_id: author_id.to_string(),
            text: text.to_string(),
            mentioned_members: parsed.mentioned_members.clone(),
            linked_note: parsed.linked_note.clone(),
            linked_todo: parsed.linked_todo.clone(),
            linked_event: parsed.linked_event.clone(),
            is_system: false,
            created_at: now,
            updated_at: now,
        };
        self.notify_mentions(&message, &channel.name, &parsed.mentioned_members)
            .await?;
        tracing::debug!(
            message_id = %message.id,
            channel_id,
            mentions = parsed.mentioned_members.len(),
            "message posted"
        );

        Ok(MessageWrite {
            message,
            references: parsed.references,
            unresolved: parsed.unresolved,
        })
    }

    pub async fn get_message(&self, id: &str) -> Result<Message, DatabaseError> {
        self.fetch_by_id("messages", SELECT_COLS, id, row_to_message)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Message, id))
    }

    /// Replace a message's text and re-resolve its references. Only members
    /// mentioned for the first time are notified.
    pub async fn update_message(
        &self,
        actor_id: Option<&str>,
        id: &str,
        text: &str,
    ) -> Result<MessageWrite, DatabaseError> {
        require_text(text)?;
        let old = self.get_message(id).await?;
        if old.is_system {
            return Err(DatabaseError::InvalidState(
                "system messages cannot be edited".into(),
            ));
        }

        let parsed = self.parse_text(text).await?;
        self.db()
            .execute(
                "UPDATE messages SET text = ?1, mentioned_members = ?2, linked_note = ?3, \
                 linked_todo = ?4, linked_event = ?5, updated_at = ?6 WHERE id = ?7",
                libsql::params![
                    text,
                    to_json_text(&parsed.mentioned_members)?,
                    parsed.linked_note.as_deref(),
                    parsed.linked_todo.as_deref(),
                    parsed.linked_event.as_deref(),
                    Utc::now().to_rfc3339(),
                    id
                ],
            )
            .await?;
        self.record_audit(actor_id, EntityType::Message, id, AuditAction::Updated, None::<&()>)
            .await?;

        let message = self.get_message(id).await?;
        let fresh: Vec<String> = parsed
            .mentioned_members
            .iter()
            .filter(|m| !old.mentioned_members.contains(m))
            .cloned()
            .collect();
        let channel = self.get_channel(&message.channel_id).await?;
        self.notify_mentions(&message, &channel.name, &fresh).await?;

        Ok(MessageWrite {
            message,
            references: parsed.references,
            unresolved: parsed.unresolved,
        })
    }

    pub async fn delete_message(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_message(id).await?;
        self.db()
            .execute("DELETE FROM messages WHERE id = ?1", [id])
            .await?;
        self.record_audit(actor_id, EntityType::Message, id, AuditAction::Deleted, None::<&()>)
            .await?;
        Ok(())
    }

    /// A channel's messages, oldest first.
    pub async fn list_messages(
        &self,
        channel_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Message>, DatabaseError> {
        self.get_channel(channel_id).await?;
        let mut filter = WhereBuilder::new();
        filter.eq_opt("channel_id", Some(channel_id));
        self.fetch_page(
            "messages",
            SELECT_COLS,
            &filter,
            "created_at, rowid",
            page,
            limit,
            row_to_message,
        )
        .await
    }

    /// Post an unparsed system message. Attributed to the actor, or to the
    /// channel's creator when there is none.
    pub(crate) async fn post_system_message(
        &self,
        channel_id: &str,
        actor_id: Option<&str>,
        text: &str,
    ) -> Result<Message, DatabaseError> {
        let channel = self.get_channel(channel_id).await?;
        let member_id = actor_id.map_or(channel.created_by, String::from);
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_MESSAGE).await?;
        self.db()
            .execute(
                "INSERT INTO messages (id, channel_id, member_id, text, is_system, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    channel_id,
                    member_id.as_str(),
                    text,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Message {
            id,
            channel_id: channel_id.to_string(),
            member_id,
            text: text.to_string(),
            mentioned_members: Vec::new(),
            linked_note: None,
            linked_todo: None,
            linked_event: None,
            is_system: true,
            created_at: now,
            updated_at: now,
        })
    }

    async fn notify_mentions(
        &self,
        message: &Message,
        channel_name: &str,
        members: &[String],
    ) -> Result<(), DatabaseError> {
        let author = self
            .find_member(&message.member_id)
            .await?
            .map_or_else(|| message.member_id.clone(), |m| m.name);
        let title = format!("{author} mentioned you in #{channel_name}");
        let entity = EntityRef::new(EntityType::Message, message.id.clone());
        for member_id in members.iter().filter(|m| **m != message.member_id) {
            self.notify(
                member_id,
                NotificationKind::Mention,
                &title,
                Some(&message.text),
                Some(&entity),
            )
            .await?;
        }
        Ok(())
    }
}
