//! Row-to-entity parsing helpers and shared SQL fragments.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use huddle_core::entities::ConnectedTo;
use huddle_core::enums::EntityType;
use huddle_core::permissions::ScopeFilter;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse an optional `YYYY-MM-DD` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a calendar date.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}"))),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all huddle-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER 0/1 column as `bool`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Parse a JSON array column (`linked_entities`, `tags`, `members`, ...).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the text is not a JSON array of `T`.
pub fn parse_json_vec<T: DeserializeOwned>(s: &str) -> Result<Vec<T>, DatabaseError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Invalid JSON array in column: {e}")))
}

/// Serialize a value for a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, DatabaseError> {
    Ok(serde_json::to_string(value)?)
}

/// Read the three denormalized scope columns starting at `idx`
/// (`location_id`, `team_id`, `member_id`).
///
/// # Errors
///
/// Returns `DatabaseError` if a column read fails.
pub fn get_connected_to(row: &libsql::Row, idx: i32) -> Result<ConnectedTo, DatabaseError> {
    Ok(ConnectedTo {
        location_id: get_opt_string(row, idx)?,
        team_id: get_opt_string(row, idx + 1)?,
        member_id: get_opt_string(row, idx + 2)?,
    })
}

/// Map `EntityType` to the corresponding SQL table name.
///
/// Exhaustive match: adding a new `EntityType` variant forces updating this.
#[must_use]
pub const fn entity_type_to_table(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Location => "locations",
        EntityType::Team => "teams",
        EntityType::Member => "members",
        EntityType::Note => "notes",
        EntityType::Todo => "todos",
        EntityType::Decision => "decisions",
        EntityType::Event => "events",
        EntityType::Channel => "channels",
        EntityType::Message => "messages",
        EntityType::Notification => "notifications",
        EntityType::Connection => "audit_trail",
    }
}

/// Column holding a document's display title.
#[must_use]
pub const fn title_column(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Location
        | EntityType::Team
        | EntityType::Member
        | EntityType::Channel => "name",
        EntityType::Message => "text",
        EntityType::Connection => "action",
        EntityType::Note
        | EntityType::Todo
        | EntityType::Decision
        | EntityType::Event
        | EntityType::Notification => "title",
    }
}

/// Column holding the member who owns a document, if the type has one.
#[must_use]
pub const fn owner_column(entity: EntityType) -> Option<&'static str> {
    match entity {
        EntityType::Note => Some("author_id"),
        EntityType::Todo | EntityType::Decision | EntityType::Event | EntityType::Channel => {
            Some("created_by")
        }
        EntityType::Message | EntityType::Notification => Some("member_id"),
        EntityType::Member => Some("id"),
        EntityType::Location | EntityType::Team | EntityType::Connection => None,
    }
}

/// Accumulates `WHERE` conditions with positional parameters.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    params: Vec<libsql::Value>,
}

impl WhereBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return its placeholder (`?N`).
    pub fn bind(&mut self, value: impl Into<libsql::Value>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    /// `column = value` when `value` is present.
    pub fn eq_opt(&mut self, column: &str, value: Option<&str>) {
        if let Some(value) = value {
            let p = self.bind(value.to_string());
            self.conditions.push(format!("{column} = {p}"));
        }
    }

    pub fn raw(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    /// Narrow rows by a permission scope filter against a document table with
    /// the standard `location_id`, `team_id`, `member_id` columns.
    pub fn scope(&mut self, filter: &ScopeFilter, owner_col: &str) {
        match filter {
            ScopeFilter::Unrestricted => {}
            ScopeFilter::Nothing => self.raw("0"),
            ScopeFilter::Restricted {
                member_id,
                team_id,
                location_id,
            } => {
                let m = self.bind(member_id.clone());
                let mut any = vec![format!("{owner_col} = {m}"), format!("member_id = {m}")];
                if let Some(team_id) = team_id {
                    let t = self.bind(team_id.clone());
                    any.push(format!("team_id = {t}"));
                }
                if let Some(location_id) = location_id {
                    let l = self.bind(location_id.clone());
                    any.push(format!("location_id = {l}"));
                }
                self.conditions.push(format!("({})", any.join(" OR ")));
            }
        }
    }

    #[must_use]
    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    #[must_use]
    pub fn params(&self) -> Vec<libsql::Value> {
        self.params.clone()
    }
}
