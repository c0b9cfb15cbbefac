//! Select builder - the relational engine the query layer replays onto
//!
//! Exposes the capability surface the deferred operations target:
//! predicate start/append, filter and eager-load joins, single and
//! additive ordering, pagination, and the terminal fetches.

pub mod execution;
pub mod sql;
pub mod types;

pub use types::{Condition, Conjunction, JoinClause, JoinKind, JoinSource, OrderDirection};

use std::marker::PhantomData;

use serde_json::Value;

use crate::entity::Entity;

/// SELECT query builder bound to an entity's table and a root alias
#[derive(Debug)]
pub struct SelectBuilder<E> {
    pub(crate) alias: String,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) order: Vec<(String, OrderDirection)>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SelectBuilder<E> {
    /// Create a builder selecting from the entity's table under `alias`
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            conditions: Vec::new(),
            joins: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            _entity: PhantomData,
        }
    }

    /// The root alias
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Start the WHERE clause, discarding any prior conditions
    pub fn where_condition(&mut self, fragment: String, binding: Option<(String, Value)>) {
        self.conditions.clear();
        self.conditions.push(Condition {
            conjunction: Conjunction::And,
            fragment,
            binding,
        });
    }

    /// Append a conjunctive condition
    pub fn and_where(&mut self, fragment: String, binding: Option<(String, Value)>) {
        self.conditions.push(Condition {
            conjunction: Conjunction::And,
            fragment,
            binding,
        });
    }

    /// Append a disjunctive condition
    pub fn or_where(&mut self, fragment: String, binding: Option<(String, Value)>) {
        self.conditions.push(Condition {
            conjunction: Conjunction::Or,
            fragment,
            binding,
        });
    }

    /// Add a filter-only inner join
    pub fn inner_join(&mut self, source: JoinSource, alias: String, extra: Option<String>) {
        self.push_join(JoinKind::Inner, source, alias, extra);
    }

    /// Add an eager-load join; the alias's columns join the result shape
    pub fn left_join_and_select(&mut self, source: JoinSource, alias: String, extra: Option<String>) {
        self.push_join(JoinKind::LeftSelect, source, alias, extra);
    }

    fn push_join(&mut self, kind: JoinKind, source: JoinSource, alias: String, extra: Option<String>) {
        self.joins.push(JoinClause {
            kind,
            path: source.path,
            table: source.table,
            alias,
            on: source.on,
            extra,
        });
    }

    /// Set the ordering, replacing any prior ORDER BY keys
    pub fn order_by(&mut self, column: String, direction: OrderDirection) {
        self.order.clear();
        self.order.push((column, direction));
    }

    /// Append an additional ORDER BY key
    pub fn add_order_by(&mut self, column: String, direction: OrderDirection) {
        self.order.push((column, direction));
    }

    /// Set the row offset
    pub fn set_first_result(&mut self, offset: i64) {
        self.offset = Some(offset);
    }

    /// Set the row limit
    pub fn set_max_results(&mut self, limit: i64) {
        self.limit = Some(limit);
    }
}
