//! Connection service.
//!
//! A connection between two linkable documents is stored as a mirrored pair
//! of references: each side's `linked_entities` array holds the other. Both
//! sides are always written inside one transaction.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use huddle_core::audit_detail::{LinkedDetail, RepairedDetail};
use huddle_core::entities::{Connection, EntityRef, LinkedEntity};
use huddle_core::enums::{AuditAction, EntityType, NotificationKind};
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{
    entity_type_to_table, get_opt_string, owner_column, parse_json_vec, title_column,
    to_json_text,
};
use crate::repos::audit::append_audit_on;
use crate::service::HuddleService;

/// One side of a connection whose mirror is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsymmetricLink {
    /// The document whose `linked_entities` holds the reference.
    pub holder: EntityRef,
    /// The referenced document, which does not point back.
    pub target: EntityRef,
    /// `target` no longer exists at all.
    pub dangling: bool,
}

fn linkable_table(entity: &EntityRef) -> Result<&'static str, DatabaseError> {
    if entity.entity_type.is_linkable() {
        Ok(entity_type_to_table(entity.entity_type))
    } else {
        Err(DatabaseError::Validation(format!(
            "{} documents cannot be connected",
            entity.entity_type
        )))
    }
}

fn validate_pair(source: &EntityRef, target: &EntityRef) -> Result<(), DatabaseError> {
    linkable_table(source)?;
    linkable_table(target)?;
    if source == target {
        return Err(DatabaseError::Validation(format!(
            "cannot connect {source} to itself"
        )));
    }
    Ok(())
}

fn linked_detail(source: &EntityRef, target: &EntityRef) -> LinkedDetail {
    LinkedDetail {
        source_type: source.entity_type.as_str().to_string(),
        source_id: source.id.clone(),
        target_type: target.entity_type.as_str().to_string(),
        target_id: target.id.clone(),
    }
}

/// Read a document's `linked_entities`, or `None` if it does not exist.
async fn read_links(
    conn: &libsql::Connection,
    entity: &EntityRef,
) -> Result<Option<Vec<EntityRef>>, DatabaseError> {
    let table = linkable_table(entity)?;
    let mut rows = conn
        .query(
            &format!("SELECT linked_entities FROM {table} WHERE id = ?1"),
            [entity.id.as_str()],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(parse_json_vec(&row.get::<String>(0)?)?)),
        None => Ok(None),
    }
}

async fn write_links(
    conn: &libsql::Connection,
    entity: &EntityRef,
    links: &[EntityRef],
) -> Result<(), DatabaseError> {
    let table = linkable_table(entity)?;
    conn.execute(
        &format!("UPDATE {table} SET linked_entities = ?1, updated_at = ?2 WHERE id = ?3"),
        libsql::params![to_json_text(links)?, Utc::now().to_rfc3339(), entity.id.as_str()],
    )
    .await?;
    Ok(())
}

/// Append `reference` to `entity`'s links if absent. Returns whether it wrote.
async fn add_mirror(
    conn: &libsql::Connection,
    entity: &EntityRef,
    mut links: Vec<EntityRef>,
    reference: &EntityRef,
) -> Result<bool, DatabaseError> {
    if links.contains(reference) {
        return Ok(false);
    }
    links.push(reference.clone());
    write_links(conn, entity, &links).await?;
    Ok(true)
}

/// Drop `reference` from `entity`'s links if present. Returns whether it wrote.
async fn remove_mirror(
    conn: &libsql::Connection,
    entity: &EntityRef,
    mut links: Vec<EntityRef>,
    reference: &EntityRef,
) -> Result<bool, DatabaseError> {
    let before = links.len();
    links.retain(|r| r != reference);
    if links.len() == before {
        return Ok(false);
    }
    write_links(conn, entity, &links).await?;
    Ok(true)
}

/// Display title of any document, or `None` if it is gone.
pub(crate) async fn title_of(
    conn: &libsql::Connection,
    entity: &EntityRef,
) -> Result<Option<String>, DatabaseError> {
    let table = entity_type_to_table(entity.entity_type);
    let column = title_column(entity.entity_type);
    let mut rows = conn
        .query(
            &format!("SELECT {column} FROM {table} WHERE id = ?1"),
            [entity.id.as_str()],
        )
        .await?;
    match rows.next().await? {
        Some(row) => get_opt_string(&row, 0),
        None => Ok(None),
    }
}

/// Remove every reference to `entity` from other documents' links.
///
/// Scans all linkable tables rather than trusting `entity`'s own array, so
/// one-sided leftovers are cleared as well. Returns the number of documents
/// rewritten.
pub(crate) async fn detach_all_on(
    conn: &libsql::Connection,
    entity: &EntityRef,
) -> Result<usize, DatabaseError> {
    let needle = format!("%\"id\":\"{}\"%", entity.id);
    let mut holders = Vec::new();
    for entity_type in EntityType::LINKABLE {
        let table = entity_type_to_table(entity_type);
        let mut rows = conn
            .query(
                &format!("SELECT id, linked_entities FROM {table} WHERE linked_entities LIKE ?1"),
                [needle.as_str()],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let holder = EntityRef::new(entity_type, row.get::<String>(0)?);
            let links: Vec<EntityRef> = parse_json_vec(&row.get::<String>(1)?)?;
            holders.push((holder, links));
        }
    }

    let mut rewritten = 0;
    for (holder, links) in holders {
        if holder == *entity {
            continue;
        }
        if remove_mirror(conn, &holder, links, entity).await? {
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

impl HuddleService {
    /// Connect two documents. Re-creating an existing connection is a no-op
    /// that still returns the pair.
    ///
    /// # Errors
    ///
    /// `Validation` for self-links and non-linkable types, `NotFound` when
    /// either document is missing.
    pub async fn create_connection(
        &self,
        actor_id: Option<&str>,
        source: &EntityRef,
        target: &EntityRef,
    ) -> Result<Connection, DatabaseError> {
        validate_pair(source, target)?;

        let tx = self.db().begin().await?;
        let source_links = read_links(&tx, source)
            .await?
            .ok_or_else(|| DatabaseError::not_found(source.entity_type, &source.id))?;
        let target_links = read_links(&tx, target)
            .await?
            .ok_or_else(|| DatabaseError::not_found(target.entity_type, &target.id))?;

        let wrote_source = add_mirror(&tx, source, source_links, target).await?;
        let wrote_target = add_mirror(&tx, target, target_links, source).await?;
        let changed = wrote_source || wrote_target;
        if changed {
            let entry = self
                .audit_entry(
                    actor_id,
                    source.entity_type,
                    &source.id,
                    AuditAction::Linked,
                    Some(&linked_detail(source, target)),
                )
                .await?;
            append_audit_on(&tx, &entry).await?;
        }
        tx.commit().await?;

        if changed {
            tracing::debug!(%source, %target, "connection created");
            self.announce_connection(actor_id, source, target).await?;
        }
        Ok(Connection {
            source: source.clone(),
            target: target.clone(),
        })
    }

    /// Remove a connection from both sides. Missing entries and a deleted
    /// document on one side are tolerated.
    ///
    /// # Errors
    ///
    /// `NotFound` only when neither document exists.
    pub async fn delete_connection(
        &self,
        actor_id: Option<&str>,
        source: &EntityRef,
        target: &EntityRef,
    ) -> Result<(), DatabaseError> {
        validate_pair(source, target)?;

        let tx = self.db().begin().await?;
        let source_links = read_links(&tx, source).await?;
        let target_links = read_links(&tx, target).await?;
        if source_links.is_none() && target_links.is_none() {
            return Err(DatabaseError::not_found(source.entity_type, &source.id));
        }

        let mut changed = false;
        if let Some(links) = source_links {
            changed |= remove_mirror(&tx, source, links, target).await?;
        }
        if let Some(links) = target_links {
            changed |= remove_mirror(&tx, target, links, source).await?;
        }
        if changed {
            let entry = self
                .audit_entry(
                    actor_id,
                    source.entity_type,
                    &source.id,
                    AuditAction::Unlinked,
                    Some(&linked_detail(source, target)),
                )
                .await?;
            append_audit_on(&tx, &entry).await?;
        }
        tx.commit().await?;

        if changed {
            tracing::debug!(%source, %target, "connection removed");
        }
        Ok(())
    }

    /// Page through a document's connections with display titles.
    pub async fn list_connections(
        &self,
        entity: &EntityRef,
        page: u32,
        limit: u32,
    ) -> Result<Page<LinkedEntity>, DatabaseError> {
        let links = read_links(self.db().conn(), entity)
            .await?
            .ok_or_else(|| DatabaseError::not_found(entity.entity_type, &entity.id))?;
        let page = Page::from_vec(links, page, limit);

        let mut items = Vec::with_capacity(page.items.len());
        for reference in page.items {
            let title = title_of(self.db().conn(), &reference).await?;
            items.push(LinkedEntity {
                entity_type: reference.entity_type,
                id: reference.id,
                title,
            });
        }
        Ok(Page {
            items,
            pagination: page.pagination,
        })
    }

    /// Remove every mirror pointing at `entity`. Returns the number of
    /// documents rewritten.
    pub async fn detach_all(&self, entity: &EntityRef) -> Result<usize, DatabaseError> {
        linkable_table(entity)?;
        let tx = self.db().begin().await?;
        let rewritten = detach_all_on(&tx, entity).await?;
        tx.commit().await?;
        Ok(rewritten)
    }

    /// Delete a linkable document on an open transaction: detach every
    /// mirror pointing at it, drop the row, and audit.
    pub(crate) async fn delete_linkable_on(
        &self,
        tx: &libsql::Connection,
        actor_id: Option<&str>,
        entity: &EntityRef,
    ) -> Result<(), DatabaseError> {
        let table = linkable_table(entity)?;
        let detached = detach_all_on(tx, entity).await?;
        tx.execute(
            &format!("DELETE FROM {table} WHERE id = ?1"),
            [entity.id.as_str()],
        )
        .await?;
        let entry = self
            .audit_entry(
                actor_id,
                entity.entity_type,
                &entity.id,
                AuditAction::Deleted,
                None::<&()>,
            )
            .await?;
        append_audit_on(tx, &entry).await?;
        tracing::debug!(%entity, detached, "document deleted");
        Ok(())
    }

    /// Report every reference whose mirror is missing.
    pub async fn audit_link_symmetry(&self) -> Result<Vec<AsymmetricLink>, DatabaseError> {
        find_asymmetric(self.db().conn()).await
    }

    /// Restore symmetry: add missing mirrors, and drop references to
    /// documents that no longer exist. Returns the number of repairs.
    pub async fn repair_link_symmetry(&self, actor_id: Option<&str>) -> Result<usize, DatabaseError> {
        let tx = self.db().begin().await?;
        let issues = find_asymmetric(&tx).await?;

        let mut repaired = 0;
        for issue in &issues {
            let (written, missing) = if issue.dangling {
                let Some(links) = read_links(&tx, &issue.holder).await? else {
                    continue;
                };
                let wrote = remove_mirror(&tx, &issue.holder, links, &issue.target).await?;
                (wrote.then_some(&issue.holder), &issue.target)
            } else {
                let Some(links) = read_links(&tx, &issue.target).await? else {
                    continue;
                };
                let wrote = add_mirror(&tx, &issue.target, links, &issue.holder).await?;
                (wrote.then_some(&issue.target), &issue.holder)
            };
            let Some(written) = written else {
                continue;
            };

            let detail = RepairedDetail {
                missing_type: missing.entity_type.as_str().to_string(),
                missing_id: missing.id.clone(),
            };
            let entry = self
                .audit_entry(
                    actor_id,
                    written.entity_type,
                    &written.id,
                    AuditAction::Repaired,
                    Some(&detail),
                )
                .await?;
            append_audit_on(&tx, &entry).await?;
            repaired += 1;
        }
        tx.commit().await?;

        if repaired > 0 {
            tracing::info!(repaired, "link symmetry repaired");
        }
        Ok(repaired)
    }

    /// Side effects of a new connection: tell the target's owner, and leave a
    /// system message in any channel involved.
    async fn announce_connection(
        &self,
        actor_id: Option<&str>,
        source: &EntityRef,
        target: &EntityRef,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn();
        let source_title = title_of(conn, source).await?.unwrap_or_default();
        let target_title = title_of(conn, target).await?.unwrap_or_default();

        if let Some(owner) = self.owner_of(target).await? {
            let is_actor = actor_id == Some(owner.as_str());
            if !is_actor && self.find_member(&owner).await?.is_some() {
                let title = format!(
                    "{} \"{source_title}\" was connected to your {} \"{target_title}\"",
                    source.entity_type, target.entity_type
                );
                self.notify(&owner, NotificationKind::Link, &title, None, Some(source))
                    .await?;
            }
        }

        for (channel, other, other_title) in [
            (target, source, &source_title),
            (source, target, &target_title),
        ] {
            if channel.entity_type == EntityType::Channel {
                let text = format!("Connected {} \"{other_title}\"", other.entity_type);
                self.post_system_message(&channel.id, actor_id, &text).await?;
            }
        }
        Ok(())
    }

    async fn owner_of(&self, entity: &EntityRef) -> Result<Option<String>, DatabaseError> {
        let Some(column) = owner_column(entity.entity_type) else {
            return Ok(None);
        };
        let table = entity_type_to_table(entity.entity_type);
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {column} FROM {table} WHERE id = ?1"),
                [entity.id.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => get_opt_string(&row, 0),
            None => Ok(None),
        }
    }
}

async fn find_asymmetric(conn: &libsql::Connection) -> Result<Vec<AsymmetricLink>, DatabaseError> {
    let mut documents: HashMap<EntityRef, Vec<EntityRef>> = HashMap::new();
    let mut order = Vec::new();
    for entity_type in EntityType::LINKABLE {
        let table = entity_type_to_table(entity_type);
        let mut rows = conn
            .query(
                &format!("SELECT id, linked_entities FROM {table} ORDER BY rowid"),
                (),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let holder = EntityRef::new(entity_type, row.get::<String>(0)?);
            let links: Vec<EntityRef> = parse_json_vec(&row.get::<String>(1)?)?;
            order.push(holder.clone());
            documents.insert(holder, links);
        }
    }

    let mut issues = Vec::new();
    for holder in order {
        let Some(links) = documents.get(&holder) else {
            continue;
        };
        for target in links {
            let issue = match documents.get(target) {
                None => Some(true),
                Some(back) if !back.contains(&holder) => Some(false),
                Some(_) => None,
            };
            if let Some(dangling) = issue {
                issues.push(AsymmetricLink {
                    holder: holder.clone(),
                    target: target.clone(),
                    dangling,
                });
            }
        }
    }
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{seed_member, seed_org, test_service};
    use huddle_core::enums::Role;
    use pretty_assertions::assert_eq;

    /// Insert a bare linkable row without going through the repos.
    async fn raw_doc(svc: &HuddleService, entity_type: EntityType, id: &str, title: &str) -> EntityRef {
        let sql = match entity_type {
            EntityType::Note => {
                "INSERT INTO notes (id, title, slug, author_id) VALUES (?1, ?2, ?1, 'mem-x')"
            }
            EntityType::Todo => "INSERT INTO todos (id, title, created_by) VALUES (?1, ?2, 'mem-x')",
            EntityType::Decision => {
                "INSERT INTO decisions (id, title, created_by) VALUES (?1, ?2, 'mem-x')"
            }
            EntityType::Event => {
                "INSERT INTO events (id, title, starts_at, created_by) VALUES (?1, ?2, '2026-05-01T09:00:00+00:00', 'mem-x')"
            }
            _ => "INSERT INTO channels (id, name, created_by) VALUES (?1, ?2, 'mem-x')",
        };
        svc.db().execute(sql, [id, title]).await.unwrap();
        EntityRef::new(entity_type, id)
    }

    async fn links(svc: &HuddleService, entity: &EntityRef) -> Vec<EntityRef> {
        read_links(svc.db().conn(), entity).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn creation_is_mirrored_and_commutative() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let todo = raw_doc(&svc, EntityType::Todo, "tdo-00000001", "Book room").await;

        svc.create_connection(None, &note, &todo).await.unwrap();
        let forward = (links(&svc, &note).await, links(&svc, &todo).await);

        svc.delete_connection(None, &note, &todo).await.unwrap();
        svc.create_connection(None, &todo, &note).await.unwrap();
        let backward = (links(&svc, &note).await, links(&svc, &todo).await);

        assert_eq!(forward, backward);
        assert_eq!(forward.0, vec![todo.clone()]);
        assert_eq!(forward.1, vec![note.clone()]);
    }

    #[tokio::test]
    async fn recreating_is_idempotent() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let event = raw_doc(&svc, EntityType::Event, "evt-00000001", "Demo").await;

        svc.create_connection(None, &note, &event).await.unwrap();
        svc.create_connection(None, &note, &event).await.unwrap();
        svc.create_connection(None, &event, &note).await.unwrap();

        assert_eq!(links(&svc, &note).await.len(), 1);
        assert_eq!(links(&svc, &event).await.len(), 1);
        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Linked),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
    }

    #[tokio::test]
    async fn rejects_self_links_and_unlinkable_types() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;

        let err = svc.create_connection(None, &note, &note).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        let member = EntityRef::new(EntityType::Member, "mem-00000001");
        let err = svc.create_connection(None, &note, &member).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
        assert!(links(&svc, &note).await.is_empty());
    }

    #[tokio::test]
    async fn missing_target_is_not_found_and_rolls_back() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let ghost = EntityRef::new(EntityType::Decision, "dec-00000404");

        let err = svc.create_connection(None, &note, &ghost).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound {
                entity_type: EntityType::Decision,
                ..
            }
        ));
        assert!(links(&svc, &note).await.is_empty());
    }

    #[tokio::test]
    async fn deletion_is_no_op_safe() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let todo = raw_doc(&svc, EntityType::Todo, "tdo-00000001", "Book room").await;

        // Never connected.
        svc.delete_connection(None, &note, &todo).await.unwrap();

        // One side already gone.
        svc.create_connection(None, &note, &todo).await.unwrap();
        svc.db()
            .execute("DELETE FROM todos WHERE id = ?1", [todo.id.as_str()])
            .await
            .unwrap();
        svc.delete_connection(None, &note, &todo).await.unwrap();
        assert!(links(&svc, &note).await.is_empty());

        // Both gone.
        let ghost = EntityRef::new(EntityType::Note, "not-00000404");
        let err = svc.delete_connection(None, &ghost, &todo).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn deletion_clears_one_sided_entries_in_either_direction() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let todo = raw_doc(&svc, EntityType::Todo, "tdo-00000001", "Book room").await;

        // The note lists the todo, the todo does not list the note.
        write_links(svc.db().conn(), &note, std::slice::from_ref(&todo))
            .await
            .unwrap();
        svc.delete_connection(None, &note, &todo).await.unwrap();
        assert!(links(&svc, &note).await.is_empty());
        assert!(links(&svc, &todo).await.is_empty());

        write_links(svc.db().conn(), &note, std::slice::from_ref(&todo))
            .await
            .unwrap();
        svc.delete_connection(None, &todo, &note).await.unwrap();
        assert!(links(&svc, &note).await.is_empty());
        assert!(links(&svc, &todo).await.is_empty());

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Unlinked),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit.iter().filter(|e| e.entity_id == note.id).count(), 1);
        assert_eq!(audit.iter().filter(|e| e.entity_id == todo.id).count(), 1);
    }

    #[tokio::test]
    async fn list_connections_populates_titles() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let todo = raw_doc(&svc, EntityType::Todo, "tdo-00000001", "Book room").await;
        let channel = raw_doc(&svc, EntityType::Channel, "chn-00000001", "general").await;
        svc.create_connection(None, &note, &todo).await.unwrap();
        svc.create_connection(None, &note, &channel).await.unwrap();

        let page = svc.list_connections(&note, 1, 1).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.items[0].title.as_deref(), Some("Book room"));

        let page = svc.list_connections(&note, 2, 1).await.unwrap();
        assert_eq!(page.items[0].id, "chn-00000001");
        assert_eq!(page.items[0].title.as_deref(), Some("general"));
    }

    #[tokio::test]
    async fn channel_connection_posts_system_message() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let channel = raw_doc(&svc, EntityType::Channel, "chn-00000001", "general").await;
        svc.create_connection(None, &note, &channel).await.unwrap();

        let messages = svc.list_messages(&channel.id, 1, 20).await.unwrap();
        assert_eq!(messages.items.len(), 1);
        assert!(messages.items[0].is_system);
        assert!(messages.items[0].text.contains("Plan"));
    }

    #[tokio::test]
    async fn target_owner_is_notified_unless_actor() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana", Role::Member, &team).await;
        let bob = seed_member(&svc, "Bob", Role::Member, &team).await;
        svc.db()
            .execute(
                "INSERT INTO todos (id, title, created_by) VALUES ('tdo-00000001', 'Book room', ?1)",
                [ana.id.as_str()],
            )
            .await
            .unwrap();
        let todo = EntityRef::new(EntityType::Todo, "tdo-00000001");
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let decision = raw_doc(&svc, EntityType::Decision, "dec-00000001", "Go").await;

        svc.create_connection(Some(&ana.id), &note, &todo).await.unwrap();
        let own = svc.list_notifications(&ana.id, false, 1, 20).await.unwrap();
        assert!(own.items.is_empty());

        svc.create_connection(Some(&bob.id), &decision, &todo).await.unwrap();
        let own = svc.list_notifications(&ana.id, false, 1, 20).await.unwrap();
        assert_eq!(own.items.len(), 1);
        assert_eq!(own.items[0].kind, NotificationKind::Link);
        assert_eq!(own.items[0].entity, Some(decision));
    }

    #[tokio::test]
    async fn detach_all_clears_one_sided_references() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let todo = raw_doc(&svc, EntityType::Todo, "tdo-00000001", "Book room").await;
        let event = raw_doc(&svc, EntityType::Event, "evt-00000001", "Demo").await;
        svc.create_connection(None, &note, &todo).await.unwrap();
        // Event points at the note, but the note does not point back.
        write_links(svc.db().conn(), &event, std::slice::from_ref(&note))
            .await
            .unwrap();

        let rewritten = svc.detach_all(&note).await.unwrap();
        assert_eq!(rewritten, 2);
        assert!(links(&svc, &todo).await.is_empty());
        assert!(links(&svc, &event).await.is_empty());
    }

    #[tokio::test]
    async fn audit_and_repair_symmetry() {
        let svc = test_service().await;
        let note = raw_doc(&svc, EntityType::Note, "not-00000001", "Plan").await;
        let todo = raw_doc(&svc, EntityType::Todo, "tdo-00000001", "Book room").await;
        let ghost = EntityRef::new(EntityType::Event, "evt-00000404");
        write_links(svc.db().conn(), &note, &[todo.clone(), ghost.clone()])
            .await
            .unwrap();

        let issues = svc.audit_link_symmetry().await.unwrap();
        assert_eq!(
            issues,
            vec![
                AsymmetricLink {
                    holder: note.clone(),
                    target: todo.clone(),
                    dangling: false,
                },
                AsymmetricLink {
                    holder: note.clone(),
                    target: ghost,
                    dangling: true,
                },
            ]
        );

        let repaired = svc.repair_link_symmetry(Some("mem-admin001")).await.unwrap();
        assert_eq!(repaired, 2);
        assert!(svc.audit_link_symmetry().await.unwrap().is_empty());
        assert_eq!(links(&svc, &note).await, vec![todo.clone()]);
        assert_eq!(links(&svc, &todo).await, vec![note]);

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Repaired),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 2);
    }
}
