//! Location repository.

use chrono::Utc;

use huddle_core::entities::Location;
use huddle_core::enums::{AuditAction, EntityType};
use huddle_core::ids::PREFIX_LOCATION;
use huddle_core::responses::Page;

use crate::error::DatabaseError;
use crate::helpers::{WhereBuilder, get_opt_string, parse_datetime};
use crate::service::HuddleService;
use crate::updates::SetClause;
use crate::updates::location::LocationUpdate;

const SELECT_COLS: &str = "id, name, address, created_at, updated_at";

fn row_to_location(row: &libsql::Row) -> Result<Location, DatabaseError> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        address: get_opt_string(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl HuddleService {
    pub async fn create_location(
        &self,
        actor_id: Option<&str>,
        name: &str,
        address: Option<&str>,
    ) -> Result<Location, DatabaseError> {
        if name.trim().is_empty() {
            return Err(DatabaseError::Validation("location name is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_LOCATION).await?;

        self.db()
            .execute(
                &format!("INSERT INTO locations ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    id.as_str(),
                    name,
                    address,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.record_audit(actor_id, EntityType::Location, &id, AuditAction::Created, None::<&()>)
            .await?;
        tracing::debug!(location_id = %id, "location created");

        Ok(Location {
            id,
            name: name.to_string(),
            address: address.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_location(&self, id: &str) -> Result<Location, DatabaseError> {
        self.fetch_by_id("locations", SELECT_COLS, id, row_to_location)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Location, id))
    }

    pub async fn update_location(
        &self,
        actor_id: Option<&str>,
        id: &str,
        update: LocationUpdate,
    ) -> Result<Location, DatabaseError> {
        self.get_location(id).await?;

        let mut set = SetClause::new();
        if let Some(ref name) = update.name {
            set.set("name", name.clone());
        }
        if let Some(ref address) = update.address {
            set.set_nullable("address", address.clone());
        }
        if set.is_empty() {
            return self.get_location(id).await;
        }

        let (sql, params) = set.into_update("locations", id, Utc::now());
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit(actor_id, EntityType::Location, id, AuditAction::Updated, Some(&update))
            .await?;
        self.get_location(id).await
    }

    /// Delete a location. Teams and members keep existing with the pointer cleared.
    pub async fn delete_location(&self, actor_id: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        self.get_location(id).await?;
        self.db()
            .execute("DELETE FROM locations WHERE id = ?1", [id])
            .await?;
        self.record_audit(actor_id, EntityType::Location, id, AuditAction::Deleted, None::<&()>)
            .await?;
        tracing::debug!(location_id = %id, "location deleted");
        Ok(())
    }

    pub async fn list_locations(&self, page: u32, limit: u32) -> Result<Page<Location>, DatabaseError> {
        self.fetch_page(
            "locations",
            SELECT_COLS,
            &WhereBuilder::new(),
            "name",
            page,
            limit,
            row_to_location,
        )
        .await
    }
}
