//! Route handlers, one module per API section.

pub mod channels;
pub mod connections;
pub mod decisions;
pub mod events;
pub mod notes;
pub mod notifications;
pub mod org;
pub mod system;
pub mod todos;

use huddle_core::entities::ConnectedTo;
use huddle_core::permissions::ScopeFilter;
use huddle_db::error::DatabaseError;
use huddle_db::repos::ListQuery;
use serde::Deserialize;

use crate::AppState;

/// Paging and `connected_to` filters shared by every list route.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub location_id: Option<String>,
    pub team_id: Option<String>,
    pub member_id: Option<String>,
}

impl ListParams {
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn limit(&self, state: &AppState) -> u32 {
        state.general.page_size(self.limit)
    }

    /// A document list query narrowed to what `scope` may view.
    #[must_use]
    pub fn query(&self, state: &AppState, scope: ScopeFilter) -> ListQuery {
        ListQuery {
            page: self.page(),
            limit: self.limit(state),
            connected_to: ConnectedTo {
                location_id: self.location_id.clone(),
                team_id: self.team_id.clone(),
                member_id: self.member_id.clone(),
            },
            scope,
        }
    }
}

/// Treat a missing referenced document as absent rather than an error.
pub(crate) fn optional<T>(result: Result<T, DatabaseError>) -> Result<Option<T>, DatabaseError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DatabaseError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}
