//! Todo extraction from note content.
//!
//! Each todo line in a note is resolved to a member and reconciled against the
//! todos already created from that note. A line that matches an existing todo
//! (same assignee, same title ignoring case) updates it in place, so
//! re-running the sync never duplicates work items.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use huddle_core::audit_detail::ExtractedDetail;
use huddle_core::entities::Todo;
use huddle_core::enums::{AuditAction, EntityType};
use huddle_core::ids::PREFIX_TODO;
use huddle_parser::{CandidateSet, TodoDraft, extract_todos, resolve};

use crate::error::DatabaseError;
use crate::repos::audit::append_audit_on;
use crate::repos::todo::{NewTodo, add_linked_todos_on, insert_todo_on};
use crate::service::HuddleService;

/// Outcome of one extraction run. Lists hold todo ids, except `unresolved`,
/// which holds the assignee tokens that matched no member (`@zed`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub unresolved: Vec<String>,
}

impl TodoSyncReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.unchanged.is_empty()
            && self.unresolved.is_empty()
    }

    fn detail(&self) -> ExtractedDetail {
        let count = |ids: &[String]| u32::try_from(ids.len()).unwrap_or(u32::MAX);
        ExtractedDetail {
            created: count(&self.created),
            updated: count(&self.updated),
            unchanged: count(&self.unchanged),
            unresolved: self.unresolved.clone(),
        }
    }
}

fn matches_draft(todo: &Todo, member_id: &str, draft: &TodoDraft) -> bool {
    todo.assigned_to.as_deref() == Some(member_id)
        && todo.title.to_lowercase() == draft.title.to_lowercase()
}

impl HuddleService {
    /// Parse a note's content and create or update its todos.
    ///
    /// Draft attributes win when present; a line without a priority or due
    /// date leaves the existing value alone. New todos inherit the note's
    /// `connected_to` and their assignees are notified.
    ///
    /// # Errors
    ///
    /// `NotFound` if the note does not exist.
    pub async fn sync_todos_from_note(
        &self,
        actor_id: Option<&str>,
        note_id: &str,
    ) -> Result<TodoSyncReport, DatabaseError> {
        let note = self.get_note(note_id).await?;
        let drafts = extract_todos(&note.content);
        if drafts.is_empty() {
            return Ok(TodoSyncReport::default());
        }

        let candidates = CandidateSet {
            members: self.member_candidates().await?,
            ..CandidateSet::default()
        };
        let mut known = self.todos_for_note(note_id).await?;
        let creator_id = actor_id.unwrap_or(note.author_id.as_str());
        let mut report = TodoSyncReport::default();
        let mut created = Vec::new();

        let tx = self.db().begin().await?;
        for draft in &drafts {
            let Some(member) = resolve(&draft.assignee, &candidates) else {
                let token = format!("@{}", draft.assignee);
                if !report.unresolved.contains(&token) {
                    report.unresolved.push(token);
                }
                continue;
            };

            if let Some(existing) = known.iter().find(|t| matches_draft(t, &member.id, draft)) {
                if report.created.contains(&existing.id)
                    || report.updated.contains(&existing.id)
                    || report.unchanged.contains(&existing.id)
                {
                    continue;
                }
                let priority = draft.priority.unwrap_or(existing.priority);
                let due_date = draft.due_date.or(existing.due_date);
                if priority == existing.priority && due_date == existing.due_date {
                    report.unchanged.push(existing.id.clone());
                    continue;
                }
                tx.execute(
                    "UPDATE todos SET priority = ?1, due_date = ?2, updated_at = ?3 WHERE id = ?4",
                    libsql::params![
                        priority.as_str(),
                        due_date.map(|d| d.to_string()),
                        Utc::now().to_rfc3339(),
                        existing.id.as_str()
                    ],
                )
                .await?;
                report.updated.push(existing.id.clone());
                continue;
            }

            let input = NewTodo {
                title: draft.title.clone(),
                priority: draft.priority.unwrap_or_default(),
                assigned_to: Some(member.id.clone()),
                connected_to: note.connected_to.clone(),
                due_date: draft.due_date,
                linked_note: Some(note_id.to_string()),
                ..NewTodo::default()
            };
            let id = self.db().generate_id(PREFIX_TODO).await?;
            let todo = insert_todo_on(&tx, &id, creator_id, &input, Utc::now()).await?;
            report.created.push(id);
            known.push(todo.clone());
            created.push(todo);
        }

        let mut linked: Vec<String> = known.iter().map(|t| t.id.clone()).collect();
        linked.retain(|id| !note.linked_todos.contains(id));
        if !linked.is_empty() {
            add_linked_todos_on(&tx, note_id, &linked).await?;
        }

        let entry = self
            .audit_entry(
                actor_id,
                EntityType::Note,
                note_id,
                AuditAction::Extracted,
                Some(&report.detail()),
            )
            .await?;
        append_audit_on(&tx, &entry).await?;
        tx.commit().await?;

        for todo in &created {
            self.notify_assignment(todo, actor_id).await?;
        }
        tracing::debug!(
            note_id,
            created = report.created.len(),
            updated = report.updated.len(),
            unresolved = report.unresolved.len(),
            "todos synced from note"
        );
        Ok(report)
    }
}
