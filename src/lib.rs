//! # fluent-orm: typed fluent queries and repositories for PostgreSQL
//!
//! Queries are built by chaining operations over compile-time property
//! tokens; every call records a deferred builder operation, and the whole
//! chain is replayed and fetched in one step when awaited. Repositories
//! provide the entry points (`get_all`, `get_by_id`, ...) plus CRUD
//! persistence for entity types.
//!
//! ```ignore
//! let users: Repository<User> = Repository::new(pool);
//! let active = users
//!     .get_all()
//!     .r#where(User::ACTIVE)
//!     .is_true()
//!     .order_by(User::NAME)
//!     .take(20)
//!     .await?;
//! ```

pub mod builder;
pub mod database;
pub mod entity;
pub mod error;
pub mod fields;
pub mod query;
pub mod repository;

#[cfg(test)]
pub(crate) mod tests;

pub use builder::{OrderDirection, SelectBuilder};
pub use database::{connect, PoolConfig};
pub use entity::{Entity, DEFAULT_ALIAS};
pub use error::{OrmError, OrmResult};
pub use fields::{Property, Relation, RelationKind};
pub use query::{ComparableQuery, FetchMode, Many, One, Query};
pub use repository::Repository;
