//! Note repository.
//!
//! Writing a note's content re-runs todo extraction (see
//! [`crate::repos::todo_sync`]), so create and update return the sync report
//! alongside the note.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huddle_core::entities::{ConnectedTo, EntityRef, Note, NoteMember};
use huddle_core::enums::{AuditAction, EntityType, NoteStatus};
use huddle_core::ids::{PREFIX_NOTE, slugify};
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_connected_to, parse_datetime, parse_enum, parse_json_vec, to_json_text,
};
use crate::repos::todo_sync::TodoSyncReport;
use crate::repos::{ListQuery, set_connected_to};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::note::NoteUpdate;

const SELECT_COLS: &str = "id, title, content, slug, author_id, location_id, team_id, member_id, \
     linked_todos, connected_members, tags, is_pinned, is_archived, status, linked_entities, \
     created_at, updated_at";

fn default_note_role() -> String {
    "viewer".to_string()
}

/// A member to attach to a note, with their role on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMemberInput {
    pub member_id: String,
    #[serde(default = "default_note_role")]
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub connected_to: ConnectedTo,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub status: NoteStatus,
    #[serde(default)]
    pub connected_members: Vec<NoteMemberInput>,
}

/// A written note and the outcome of extracting todos from its content.
#[derive(Debug, Clone, Serialize)]
pub struct NoteWrite {
    #[serde(flatten)]
    pub note: Note,
    pub todo_sync: TodoSyncReport,
}

fn row_to_note(row: &libsql::Row) -> Result<Note, DatabaseError> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        slug: row.get(3)?,
        author_id: row.get(4)?,
        connected_to: get_connected_to(row, 5)?,
        linked_todos: parse_json_vec(&row.get::<String>(8)?)?,
        connected_members: parse_json_vec(&row.get::<String>(9)?)?,
        tags: parse_json_vec(&row.get::<String>(10)?)?,
        is_pinned: get_bool(row, 11)?,
        is_archived: get_bool(row, 12)?,
        status: parse_enum(&row.get::<String>(13)?)?,
        linked_entities: parse_json_vec(&row.get::<String>(14)?)?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    })
}

/// Normalize tags: trimmed, lowercase, no blanks or duplicates.
fn clean_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

impl HuddleService {
    /// A slug for `title` that no other note uses. Collisions get the note
    /// id's random suffix appended.
    async fn unique_slug(&self, title: &str, note_id: &str) -> Result<String, DatabaseError> {
        let suffix = note_id.rsplit('-').next().unwrap_or(note_id);
        let base = slugify(title);
        if base.is_empty() {
            return Ok(suffix.to_string());
        }
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT 1 FROM notes WHERE slug = ?1 AND id != ?2",
                libsql::params![base.as_str(), note_id],
            )
            .await?;
        if rows.next().await?.is_some() {
            Ok(format!("{base}-{suffix}"))
        } else {
            Ok(base)
        }
    }

    /// Resolve member inputs, keeping `added_at` for members already attached.
    async fn note_members(
        &self,
        inputs: &[NoteMemberInput],
        existing: &[NoteMember],
        now: DateTime<Utc>,
    ) -> Result<Vec<NoteMember>, DatabaseError> {
        let mut members: Vec<NoteMember> = Vec::with_capacity(inputs.len());
        for input in inputs {
            if members.iter().any(|m| m.member_id == input.member_id) {
                continue;
            }
            self.get_member(&input.member_id).await?;
            let added_at = existing
                .iter()
                .find(|m| m.member_id == input.member_id)
                .map_or(now, |m| m.added_at);
            members.push(NoteMember {
                member_id: input.member_id.clone(),
                role: input.role.clone(),
                added_at,
            });
        }
        Ok(members)
    }

    /// Create a note authored by `author_id` and extract todos from its content.
    pub async fn create_note(&self, author_id: &str, input: NewNote) -> Result<NoteWrite, DatabaseError> {
        if input.title.trim().is_empty() {
            return Err(DatabaseError::Validation("note title is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_NOTE).await?;
        let slug = self.unique_slug(&input.title, &id).await?;
        let members = self.note_members(&input.connected_members, &[], now).await?;
        let ct = &input.connected_to;

        self.db()
            .execute(
                &format!(
                    "INSERT INTO notes ({SELECT_COLS}) VALUES \
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, '[]', ?9, ?10, ?11, 0, ?12, '[]', ?13, ?14)"
                ),
                libsql::params![
                    id.as_str(),
                    input.title.as_str(),
                    input.content.as_str(),
                    slug.as_str(),
                    author_id,
                    ct.location_id.as_deref(),
                    ct.team_id.as_deref(),
                    ct.member_id.as_deref(),
                    to_json_text(&members)?,
                    to_json_text(&clean_tags(&input.tags))?,
                    i64::from(input.is_pinned),
                    input.status.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::from_unique(e, &format!("note with slug {slug}")))?;
        self.record_audit(Some(author_id), EntityType::Note, &id, AuditAction::Created, None::<&()>)
            .await?;
        tracing::debug!(note_id = %id, %slug, "note created");

        let todo_sync = self.sync_todos_from_note(Some(author_id), &id).await?;
        Ok(NoteWrite {
            note: self.get_note(&id).await?,
            todo_sync,
        })
    }

    pub async fn get_note(&self, id: &str) -> Result<Note, DatabaseError> {
        self.fetch_by_id("notes", SELECT_COLS, id, row_to_note)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Note, id))
    }

    /// Update a note. A title change re-derives the slug; a content change
    /// re-runs todo extraction.
    pub async fn update_note(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: NoteUpdate,
    ) -> Result<NoteWrite, DatabaseError> {
        let current = self.get_note(id).await?;
        let now = Utc::now();

        let mut set = SetClause::new();
        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(DatabaseError::Validation("note title is required".into()));
            }
            set.set("title", title.clone());
            set.set("slug", self.unique_slug(title, id).await?);
        }
        let content_changed = update
            .content
            .as_ref()
            .is_some_and(|c| *c != current.content);
        if let Some(ref content) = update.content {
            set.set("content", content.clone());
        }
        if let Some(ref tags) = update.tags {
            set.set("tags", to_json_text(&clean_tags(tags))?);
        }
        if let Some(is_pinned) = update.is_pinned {
            set.set("is_pinned", i64::from(is_pinned));
        }
        if let Some(is_archived) = update.is_archived {
            set.set("is_archived", i64::from(is_archived));
        }
        if let Some(status) = update.status {
            set.set("status", status.as_str());
        }
        if let Some(ref connected_to) = update.connected_to {
            set_connected_to(&mut set, connected_to);
        }
        if let Some(ref inputs) = update.connected_members {
            let members = self
                .note_members(inputs, &current.connected_members, now)
                .await?;
            set.set("connected_members", to_json_text(&members)?);
        }
        if set.is_empty() {
            return Ok(NoteWrite {
                note: current,
                todo_sync: TodoSyncReport::default(),
            });
        }

        let (sql, params) = set.into_update("notes", id, now);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| DatabaseError::from_unique(e, "note with this slug"))?;
        self.record_audit(actor_id, EntityType::Note, id, AuditAction::Updated, Some(&update))
            .await?;

        let todo_sync = if content_changed {
            self.sync_todos_from_note(actor_id, id).await?
        } else {
            TodoSyncReport::default()
        };
        Ok(NoteWrite {
            note: self.get_note(id).await?,
            todo_sync,
        })
    }

    /// Delete a note. Its todos survive but lose their `linked_note`.
    pub async fn delete_note(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_note(id).await?;
        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE todos SET linked_note = NULL, updated_at = ?1 WHERE linked_note = ?2",
            libsql::params![Utc::now().to_rfc3339(), id],
        )
        .await?;
        self.delete_linkable_on(&tx, actor_id, &EntityRef::new(EntityType::Note, id))
            .await?;
        tx.commit().await
    }

    /// Notes with pinned ones first, then most recently updated.
    pub async fn list_notes(&self, query: &ListQuery) -> Result<Page<Note>, DatabaseError> {
        let filter = query.document_filter("author_id");
        self.fetch_page(
            "notes",
            SELECT_COLS,
            &filter,
            "is_pinned DESC, updated_at DESC, rowid DESC",
            query.page,
            query.limit,
            row_to_note,
        )
        .await
    }
}
