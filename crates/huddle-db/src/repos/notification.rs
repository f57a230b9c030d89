//! Notification repository.
//!
//! Notifications are written as side effects of other mutations (mentions,
//! assignments, new connections) and only read back by their recipient.

use chrono::Utc;

use huddle_core::entities::{EntityRef, Notification};
use huddle_core::enums::{EntityType, NotificationKind};
use huddle_core::ids::PREFIX_NOTIFICATION;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{WhereBuilder, get_bool, get_opt_string, parse_datetime, parse_enum};
use crate::service::HuddleService;

const SELECT_COLS: &str =
    "id, member_id, kind, title, body, entity_type, entity_id, is_read, created_at";

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    let entity = match (get_opt_string(row, 5)?, get_opt_string(row, 6)?) {
        (Some(entity_type), Some(id)) => Some(EntityRef::new(parse_enum(&entity_type)?, id)),
        _ => None,
    };
    Ok(Notification {
        id: row.get(0)?,
        member_id: row.get(1)?,
        kind: parse_enum(&row.get::<String>(2)?)?,
        title: row.get(3)?,
        body: get_opt_string(row, 4)?,
        entity,
        is_read: get_bool(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl HuddleService {
    /// Deliver a notification to one member.
    pub(crate) async fn notify(
        &self,
        member_id: &str,
        kind: NotificationKind,
        title: &str,
        body: Option<&str>,
        entity: Option<&EntityRef>,
    ) -> Result<Notification, DatabaseError> {
        let id = self.db().generate_id(PREFIX_NOTIFICATION).await?;
        let now = Utc::now();
        self.db()
            .execute(
                &format!(
                    "INSERT INTO notifications ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    member_id,
                    kind.as_str(),
                    title,
                    body,
                    entity.map(|e| e.entity_type.as_str()),
                    entity.map(|e| e.id.as_str()),
                    now.to_rfc3339()
                ],
            )
            .await?;
        tracing::debug!(notification_id = %id, member_id, kind = %kind, "notification sent");

        Ok(Notification {
            id,
            member_id: member_id.to_string(),
            kind,
            title: title.to_string(),
            body: body.map(String::from),
            entity: entity.cloned(),
            is_read: false,
            created_at: now,
        })
    }

    /// A member's notifications, newest first.
    pub async fn list_notifications(
        &self,
        member_id: &str,
        unread_only: bool,
        page: u32,
        limit: u32,
    ) -> Result<Page<Notification>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.eq_opt("member_id", Some(member_id));
        if unread_only {
            filter.raw("is_read = 0");
        }
        self.fetch_page(
            "notifications",
            SELECT_COLS,
            &filter,
            "created_at DESC, rowid DESC",
            page,
            limit,
            row_to_notification,
        )
        .await
    }

    /// Mark one of the member's notifications as read. Another member's
    /// notification is reported as not found.
    pub async fn mark_notification_read(
        &self,
        member_id: &str,
        id: &str,
    ) -> Result<Notification, DatabaseError> {
        let notification = self
            .fetch_by_id("notifications", SELECT_COLS, id, row_to_notification)
            .await?
            .filter(|n| n.member_id == member_id)
            .ok_or_else(|| DatabaseError::not_found(EntityType::Notification, id))?;
        if notification.is_read {
            return Ok(notification);
        }
        self.db()
            .execute("UPDATE notifications SET is_read = 1 WHERE id = ?1", [id])
            .await?;
        Ok(Notification {
            is_read: true,
            ..notification
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_member, seed_org, test_service};
    use huddle_core::enums::Role;

    #[tokio::test]
    async fn notify_list_and_mark_read() {
        let svc = test_service().await;
        let (_, team) = seed_org(&svc).await;
        let ana = seed_member(&svc, "Ana", Role::Member, &team).await;
        let bob = seed_member(&svc, "Bob", Role::Member, &team).await;

        let target = EntityRef::new(EntityType::Todo, "tdo-00000001");
        let sent = svc
            .notify(&ana.id, NotificationKind::Assignment, "New todo", None, Some(&target))
            .await
            .unwrap();
        svc.notify(&ana.id, NotificationKind::Mention, "Mentioned", Some("hi"), None)
            .await
            .unwrap();

        let all = svc.list_notifications(&ana.id, false, 1, 20).await.unwrap();
        assert_eq!(all.pagination.total, 2);
        assert_eq!(all.items[0].kind, NotificationKind::Mention);
        assert_eq!(all.items[1].entity, Some(target));

        let err = svc.mark_notification_read(&bob.id, &sent.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));

        let read = svc.mark_notification_read(&ana.id, &sent.id).await.unwrap();
        assert!(read.is_read);
        let unread = svc.list_notifications(&ana.id, true, 1, 20).await.unwrap();
        assert_eq!(unread.items.len(), 1);
    }
}
