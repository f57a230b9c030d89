//! Update types for entity mutations.
//!
//! Each update struct has `Option` fields. Only `Some` fields generate SET
//! clauses in the dynamic UPDATE SQL. Nullable columns use `Option<Option<T>>`
//! so that "leave unchanged" (`None`) differs from "clear" (`Some(None)`).
//! The structs deserialize straight from PATCH bodies and serialize as the
//! audit `detail` payload (changed fields only).

pub mod channel;
pub mod decision;
pub mod event;
pub mod location;
pub mod member;
pub mod note;
pub mod team;
pub mod todo;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`, so that a
/// missing field stays `None` via `#[serde(default)]`.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Accumulates `SET` assignments with positional parameters.
#[derive(Debug, Default)]
pub(crate) struct SetClause {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl SetClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    /// Set a nullable column; `None` writes SQL NULL.
    pub fn set_nullable(&mut self, column: &str, value: Option<String>) {
        self.set(column, value.map_or(libsql::Value::Null, Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish into `UPDATE {table} SET ... , updated_at = ? WHERE id = ?`.
    pub fn into_update(
        mut self,
        table: &str,
        id: &str,
        now: DateTime<Utc>,
    ) -> (String, Vec<libsql::Value>) {
        self.set("updated_at", now.to_rfc3339());
        self.params.push(id.into());
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            self.sets.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn double_option_distinguishes_missing_and_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        assert_eq!(missing.description, None);
        assert_eq!(null.description, Some(None));
        assert_eq!(set.description, Some(Some("x".into())));
    }

    #[test]
    fn set_clause_appends_updated_at_and_id() {
        let mut set = SetClause::new();
        set.set("title", "New");
        set.set_nullable("description", None);
        let (sql, params) = set.into_update("notes", "not-1", Utc::now());
        assert_eq!(
            sql,
            "UPDATE notes SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4"
        );
        assert_eq!(params.len(), 4);
        assert!(matches!(params[1], libsql::Value::Null));
    }
}
