//! Core Entity trait - base definition for persisted types
//!
//! Defines the contract a type must satisfy to be queried and persisted:
//! table metadata, id access, row hydration, and the field pairs used by
//! INSERT/UPDATE statements.

use std::fmt::{Debug, Display};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::postgres::PgRow;

use crate::error::OrmResult;

/// Root alias used when the caller does not supply one
pub const DEFAULT_ALIAS: &str = "entity";

/// Core trait for database entities
pub trait Entity: Send + Sync + Debug + Serialize + DeserializeOwned + Sized {
    /// The type of this entity's id column
    type Id: Clone + Send + Sync + Debug + Display + Into<Value>;

    /// Table name for this entity
    fn table_name() -> &'static str;

    /// Id column name
    fn id_column() -> &'static str {
        "id"
    }

    /// Get the id value, if one has been assigned
    fn id(&self) -> Option<Self::Id>;

    /// Assign or clear the id value
    fn set_id(&mut self, id: Option<Self::Id>);

    /// Hydrate an instance from a database row
    fn from_row(row: &PgRow) -> OrmResult<Self>;

    /// Non-id column/value pairs, in statement order, for INSERT and UPDATE
    fn insert_fields(&self) -> Vec<(&'static str, Value)>;
}
