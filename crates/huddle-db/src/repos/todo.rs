//! Todo repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use huddle_core::audit_detail::StatusChangedDetail;
use huddle_core::entities::{ConnectedTo, EntityRef, Todo};
use huddle_core::enums::{AuditAction, EntityType, NotificationKind, Priority, TodoStatus};
use huddle_core::ids::PREFIX_TODO;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{
    get_connected_to, get_opt_string, parse_datetime, parse_enum, parse_json_vec,
    parse_optional_date, to_json_text,
};
use crate::repos::audit::append_audit_on;
use crate::repos::{ListQuery, set_connected_to};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::todo::TodoUpdate;

pub(crate) const SELECT_COLS: &str = "id, title, description, status, priority, assigned_to, \
     created_by, location_id, team_id, member_id, list_id, due_date, linked_note, linked_chat, \
     linked_entities, created_at, updated_at";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub connected_to: ConnectedTo,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub linked_note: Option<String>,
    #[serde(default)]
    pub linked_chat: Option<String>,
}

pub(crate) fn row_to_todo(row: &libsql::Row) -> Result<Todo, DatabaseError> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        priority: parse_enum(&row.get::<String>(4)?)?,
        assigned_to: get_opt_string(row, 5)?,
        created_by: row.get(6)?,
        connected_to: get_connected_to(row, 7)?,
        list_id: get_opt_string(row, 10)?,
        due_date: parse_optional_date(get_opt_string(row, 11)?.as_deref())?,
        linked_note: get_opt_string(row, 12)?,
        linked_chat: get_opt_string(row, 13)?,
        linked_entities: parse_json_vec(&row.get::<String>(14)?)?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    })
}

/// Insert a todo row on an open connection or transaction.
pub(crate) async fn insert_todo_on(
    conn: &libsql::Connection,
    id: &str,
    creator_id: &str,
    input: &NewTodo,
    now: DateTime<Utc>,
) -> Result<Todo, DatabaseError> {
    let ct = &input.connected_to;
    conn.execute(
        &format!(
            "INSERT INTO todos ({SELECT_COLS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, '[]', ?15, ?16)"
        ),
        libsql::params![
            id,
            input.title.as_str(),
            input.description.as_deref(),
            TodoStatus::Pending.as_str(),
            input.priority.as_str(),
            input.assigned_to.as_deref(),
            creator_id,
            ct.location_id.as_deref(),
            ct.team_id.as_deref(),
            ct.member_id.as_deref(),
            input.list_id.as_deref(),
            input.due_date.map(|d| d.to_string()),
            input.linked_note.as_deref(),
            input.linked_chat.as_deref(),
            now.to_rfc3339(),
            now.to_rfc3339()
        ],
    )
    .await?;

    Ok(Todo {
        id: id.to_string(),
        title: input.title.clone(),
        description: input.description.clone(),
        status: TodoStatus::Pending,
        priority: input.priority,
        assigned_to: input.assigned_to.clone(),
        created_by: creator_id.to_string(),
        connected_to: input.connected_to.clone(),
        list_id: input.list_id.clone(),
        due_date: input.due_date,
        linked_note: input.linked_note.clone(),
        linked_chat: input.linked_chat.clone(),
        linked_entities: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

async fn read_linked_todos(
    conn: &libsql::Connection,
    note_id: &str,
) -> Result<Option<Vec<String>>, DatabaseError> {
    let mut rows = conn
        .query("SELECT linked_todos FROM notes WHERE id = ?1", [note_id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(parse_json_vec(&row.get::<String>(0)?)?)),
        None => Ok(None),
    }
}

async fn write_linked_todos(
    conn: &libsql::Connection,
    note_id: &str,
    todo_ids: &[String],
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE notes SET linked_todos = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![to_json_text(todo_ids)?, Utc::now().to_rfc3339(), note_id],
    )
    .await?;
    Ok(())
}

/// Append todo ids to a note's `linked_todos`, skipping ones already there.
pub(crate) async fn add_linked_todos_on(
    conn: &libsql::Connection,
    note_id: &str,
    todo_ids: &[String],
) -> Result<(), DatabaseError> {
    let Some(mut linked) = read_linked_todos(conn, note_id).await? else {
        return Err(DatabaseError::not_found(EntityType::Note, note_id));
    };
    let before = linked.len();
    for id in todo_ids {
        if !linked.contains(id) {
            linked.push(id.clone());
        }
    }
    if linked.len() != before {
        write_linked_todos(conn, note_id, &linked).await?;
    }
    Ok(())
}

async fn remove_linked_todo_on(
    conn: &libsql::Connection,
    note_id: &str,
    todo_id: &str,
) -> Result<(), DatabaseError> {
    let Some(mut linked) = read_linked_todos(conn, note_id).await? else {
        return Ok(());
    };
    let before = linked.len();
    linked.retain(|id| id != todo_id);
    if linked.len() != before {
        write_linked_todos(conn, note_id, &linked).await?;
    }
    Ok(())
}

impl HuddleService {
    /// Create a todo. A todo created from a note is appended to the note's
    /// `linked_todos`; the assignee is notified unless they created it.
    pub async fn create_todo(&self, creator_id: &str, input: NewTodo) -> Result<Todo, DatabaseError> {
        if input.title.trim().is_empty() {
            return Err(DatabaseError::Validation("todo title is required".into()));
        }
        if let Some(ref assignee) = input.assigned_to {
            self.get_member(assignee).await?;
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_TODO).await?;
        let tx = self.db().begin().await?;
        let todo = insert_todo_on(&tx, &id, creator_id, &input, now).await?;
        if let Some(ref note_id) = input.linked_note {
            add_linked_todos_on(&tx, note_id, std::slice::from_ref(&id)).await?;
        }
        let entry = self
            .audit_entry(Some(creator_id), EntityType::Todo, &id, AuditAction::Created, None::<&()>)
            .await?;
        append_audit_on(&tx, &entry).await?;
        tx.commit().await?;

        tracing::debug!(todo_id = %id, assigned_to = ?todo.assigned_to, "todo created");
        self.notify_assignment(&todo, Some(creator_id)).await?;
        Ok(todo)
    }

    pub async fn get_todo(&self, id: &str) -> Result<Todo, DatabaseError> {
        self.fetch_by_id("todos", SELECT_COLS, id, row_to_todo)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Todo, id))
    }

    /// Todos created from a note, oldest first.
    pub async fn todos_for_note(&self, note_id: &str) -> Result<Vec<Todo>, DatabaseError> {
        self.fetch_all(
            &format!("SELECT {SELECT_COLS} FROM todos WHERE linked_note = ?1 ORDER BY created_at, rowid"),
            vec![note_id.into()],
            row_to_todo,
        )
        .await
    }

    /// Update a todo. Status changes must follow the todo lifecycle, and a
    /// new assignee is notified.
    pub async fn update_todo(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: TodoUpdate,
    ) -> Result<Todo, DatabaseError> {
        let current = self.get_todo(id).await?;

        let mut set = SetClause::new();
        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(DatabaseError::Validation("todo title is required".into()));
            }
            set.set("title", title.clone());
        }
        if let Some(ref description) = update.description {
            set.set_nullable("description", description.clone());
        }
        let status_change = update.status.filter(|s| *s != current.status);
        if let Some(next) = status_change {
            if !current.status.can_transition_to(next) {
                return Err(DatabaseError::InvalidState(format!(
                    "todo cannot move from {} to {next}",
                    current.status
                )));
            }
            set.set("status", next.as_str());
        }
        if let Some(priority) = update.priority {
            set.set("priority", priority.as_str());
        }
        let reassigned = update
            .assigned_to
            .as_ref()
            .is_some_and(|a| *a != current.assigned_to);
        if let Some(ref assigned_to) = update.assigned_to {
            if let Some(member_id) = assigned_to {
                self.get_member(member_id).await?;
            }
            set.set_nullable("assigned_to", assigned_to.clone());
        }
        if let Some(due_date) = update.due_date {
            set.set_nullable("due_date", due_date.map(|d| d.to_string()));
        }
        if let Some(ref list_id) = update.list_id {
            set.set_nullable("list_id", list_id.clone());
        }
        if let Some(ref linked_chat) = update.linked_chat {
            set.set_nullable("linked_chat", linked_chat.clone());
        }
        if let Some(ref connected_to) = update.connected_to {
            set_connected_to(&mut set, connected_to);
        }
        if set.is_empty() {
            return Ok(current);
        }

        let (sql, params) = set.into_update("todos", id, Utc::now());
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        if let Some(next) = status_change {
            let detail = StatusChangedDetail {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            };
            self.record_audit(actor_id, EntityType::Todo, id, AuditAction::StatusChanged, Some(&detail))
                .await?;
        } else {
            self.record_audit(actor_id, EntityType::Todo, id, AuditAction::Updated, Some(&update))
                .await?;
        }

        let todo = self.get_todo(id).await?;
        if reassigned {
            self.notify_assignment(&todo, actor_id).await?;
        }
        Ok(todo)
    }

    /// Delete a todo, removing it from its note and from every connection.
    pub async fn delete_todo(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let todo = self.get_todo(id).await?;
        let tx = self.db().begin().await?;
        if let Some(ref note_id) = todo.linked_note {
            remove_linked_todo_on(&tx, note_id, id).await?;
        }
        self.delete_linkable_on(&tx, actor_id, &EntityRef::new(EntityType::Todo, id))
            .await?;
        tx.commit().await
    }

    /// Todos by priority, most urgent first, then due date.
    pub async fn list_todos(&self, query: &ListQuery) -> Result<Page<Todo>, DatabaseError> {
        let filter = query.document_filter("created_by");
        self.fetch_page(
            "todos",
            SELECT_COLS,
            &filter,
            "CASE priority WHEN 'urgent' THEN 0 WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END, \
             due_date IS NULL, due_date, created_at",
            query.page,
            query.limit,
            row_to_todo,
        )
        .await
    }

    /// Tell a todo's assignee about it, unless they are the one acting.
    pub(crate) async fn notify_assignment(
        &self,
        todo: &Todo,
        actor_id: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let Some(ref assignee) = todo.assigned_to else {
            return Ok(());
        };
        if actor_id == Some(assignee.as_str()) {
            return Ok(());
        }
        let title = format!("You were assigned \"{}\"", todo.title);
        let body = todo.due_date.map(|d| format!("Due {d}"));
        self.notify(
            assignee,
            NotificationKind::Assignment,
            &title,
            body.as_deref(),
            Some(&EntityRef::new(EntityType::Todo, todo.id.clone())),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_member, seed_org, team_scope, test_service};
    use crate::updates::todo::TodoUpdateBuilder;
    use huddle_core::enums::Role;
    use huddle_core::permissions::ScopeFilter;
    use pretty_assertions::assert_eq;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.into(),
            ..NewTodo::default()
        }
    }

    #[tokio::test]
    async fn assignment_is_notified_once() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana", Role::Manager, &team).await;
        let bob = seed_member(&svc, "Bob", Role::Member, &team).await;

        let todo = svc
            .create_todo(
                &ana.id,
                NewTodo {
                    assigned_to: Some(bob.id.clone()),
                    due_date: NaiveDate::from_ymd_opt(2026, 3, 1),
                    ..new_todo("Book room")
                },
            )
            .await
            .unwrap();
        let inbox = svc.list_notifications(&bob.id, false, 1, 20).await.unwrap();
        assert_eq!(inbox.items.len(), 1);
        assert_eq!(inbox.items[0].kind, NotificationKind::Assignment);
        assert_eq!(inbox.items[0].body.as_deref(), Some("Due 2026-03-01"));

        // Self-assignment is silent.
        svc.update_todo(
            Some(&ana.id),
            &todo.id,
            TodoUpdateBuilder::new().assigned_to(Some(ana.id.clone())).build(),
        )
        .await
        .unwrap();
        let inbox = svc.list_notifications(&ana.id, false, 1, 20).await.unwrap();
        assert!(inbox.items.is_empty());
    }

    #[tokio::test]
    async fn unknown_assignee_is_not_found() {
        let svc = test_service().await;
        let err = svc
            .create_todo(
                "mem-00000001",
                NewTodo {
                    assigned_to: Some("mem-00000404".into()),
                    ..new_todo("Ghost work")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound {
                entity_type: EntityType::Member,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn status_transitions_are_checked() {
        let svc = test_service().await;
        let todo = svc.create_todo("mem-00000001", new_todo("Ship")).await.unwrap();

        let done = svc
            .update_todo(
                None,
                &todo.id,
                TodoUpdateBuilder::new().status(TodoStatus::Completed).build(),
            )
            .await
            .unwrap();
        assert_eq!(done.status, TodoStatus::Completed);

        let err = svc
            .update_todo(
                None,
                &todo.id,
                TodoUpdateBuilder::new().status(TodoStatus::InProgress).build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn list_orders_by_priority_and_scope() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        svc.create_todo(
            "mem-00000001",
            NewTodo {
                connected_to: team_scope(&team),
                ..new_todo("Routine one")
            },
        )
        .await
        .unwrap();
        svc.create_todo(
            "mem-00000001",
            NewTodo {
                priority: Priority::Urgent,
                connected_to: team_scope(&team),
                ..new_todo("Urgent one")
            },
        )
        .await
        .unwrap();
        svc.create_todo("mem-00000002", new_todo("Elsewhere")).await.unwrap();

        let all = svc.list_todos(&ListQuery::default()).await.unwrap();
        assert_eq!(all.items[0].title, "Urgent one");
        assert_eq!(all.pagination.total, 3);

        let scoped = svc
            .list_todos(&ListQuery {
                scope: ScopeFilter::Restricted {
                    member_id: "mem-00000009".into(),
                    team_id: Some(team.id.clone()),
                    location_id: None,
                },
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(scoped.items.len(), 2);
    }
}
