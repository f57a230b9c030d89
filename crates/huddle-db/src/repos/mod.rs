//! Repository modules implementing operations for all Huddle documents.
//!
//! Each module adds methods to `HuddleService` via `impl HuddleService` blocks.

pub mod audit;
pub mod channel;
pub mod decision;
pub mod event;
pub mod link;
pub mod location;
pub mod member;
pub mod message;
pub mod note;
pub mod notification;
pub mod team;
pub mod todo;
pub mod todo_sync;

use huddle_core::entities::ConnectedTo;
use huddle_core::permissions::ScopeFilter;
use huddle_core::responses::{Page, Pagination};

use crate::error::DatabaseError;
use crate::helpers::WhereBuilder;
use crate::service::HuddleService;
use crate::updates::SetClause;

/// Paging, `connected_to` filters, and the caller's view scope for a list query.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub connected_to: ConnectedTo,
    pub scope: ScopeFilter,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            connected_to: ConnectedTo::default(),
            scope: ScopeFilter::Unrestricted,
        }
    }
}

impl ListQuery {
    /// Conditions for a document table with scope columns and an owner column.
    pub(crate) fn document_filter(&self, owner_col: &str) -> WhereBuilder {
        let mut w = WhereBuilder::new();
        w.eq_opt("location_id", self.connected_to.location_id.as_deref());
        w.eq_opt("team_id", self.connected_to.team_id.as_deref());
        w.eq_opt("member_id", self.connected_to.member_id.as_deref());
        w.scope(&self.scope, owner_col);
        w
    }
}

/// Write the three `connected_to` columns.
pub(crate) fn set_connected_to(set: &mut SetClause, connected_to: &ConnectedTo) {
    set.set_nullable("location_id", connected_to.location_id.clone());
    set.set_nullable("team_id", connected_to.team_id.clone());
    set.set_nullable("member_id", connected_to.member_id.clone());
}

impl HuddleService {
    /// Run a paginated SELECT and map each row.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn fetch_page<T>(
        &self,
        table: &str,
        columns: &str,
        filter: &WhereBuilder,
        order_by: &str,
        page: u32,
        limit: u32,
        map_row: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<Page<T>, DatabaseError> {
        let where_clause = filter.clause();

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT COUNT(*) FROM {table} {where_clause}"),
                libsql::params_from_iter(filter.params()),
            )
            .await?;
        let total = rows
            .next()
            .await?
            .ok_or(DatabaseError::NoResult)?
            .get::<i64>(0)?;
        let pagination = Pagination::new(page, limit, u64::try_from(total).unwrap_or(0));

        let offset = u64::from(pagination.page - 1) * u64::from(pagination.limit);
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {columns} FROM {table} {where_clause} ORDER BY {order_by} LIMIT {} OFFSET {offset}",
                    pagination.limit
                ),
                libsql::params_from_iter(filter.params()),
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(map_row(&row)?);
        }
        Ok(Page { items, pagination })
    }

    /// Run an unpaginated SELECT and map each row.
    pub(crate) async fn fetch_all<T>(
        &self,
        sql: &str,
        params: Vec<libsql::Value>,
        map_row: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<Vec<T>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(sql, libsql::params_from_iter(params))
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(map_row(&row)?);
        }
        Ok(items)
    }

    /// Fetch a single row by id, or `None` when it does not exist.
    pub(crate) async fn fetch_by_id<T>(
        &self,
        table: &str,
        columns: &str,
        id: &str,
        map_row: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<Option<T>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {columns} FROM {table} WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }
}
