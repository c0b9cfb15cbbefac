//! Fluent query layer - typed chain construction over the select builder
//!
//! A chain is built synchronously with no I/O: every call records one
//! deferred operation (or amends the last one) and the whole list is
//! replayed against the builder only when the chain is executed. The
//! terminal fetch shape is fixed when the chain is created.

pub mod chain;
pub mod comparable;
pub mod includes;
pub(crate) mod ops;
pub mod ordering;
pub mod pagination;
pub mod predicates;
pub(crate) mod state;

pub use chain::Query;
pub use comparable::ComparableQuery;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::builder::SelectBuilder;
use crate::entity::Entity;
use crate::error::OrmResult;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::One {}
    impl Sealed for super::Many {}
}

/// Terminal fetch shape, fixed for the chain's lifetime
#[async_trait]
pub trait FetchMode<E: Entity>: sealed::Sealed + Send {
    /// What the terminal fetch resolves to
    type Output: Send;

    async fn fetch(builder: &SelectBuilder<E>, pool: &PgPool) -> OrmResult<Self::Output>;
}

/// Terminal mode resolving to one row or none
#[derive(Debug)]
pub enum One {}

/// Terminal mode resolving to a list, possibly empty
#[derive(Debug)]
pub enum Many {}

#[async_trait]
impl<E: Entity> FetchMode<E> for One {
    type Output = Option<E>;

    async fn fetch(builder: &SelectBuilder<E>, pool: &PgPool) -> OrmResult<Self::Output> {
        builder.get_one(pool).await
    }
}

#[async_trait]
impl<E: Entity> FetchMode<E> for Many {
    type Output = Vec<E>;

    async fn fetch(builder: &SelectBuilder<E>, pool: &PgPool) -> OrmResult<Self::Output> {
        builder.get_many(pool).await
    }
}
