//! Query chain state - aliases, clause mode, and the operation queue

use std::collections::HashSet;

use sqlx::PgPool;

use crate::builder::SelectBuilder;
use crate::entity::Entity;
use crate::error::OrmError;
use crate::query::ops::OperationQueue;

/// What kind of clause the chain is currently building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClauseMode {
    /// Predicates attach directly to `<alias>.<property>`
    Plain,
    /// Predicates splice into a filter join's ON clause
    JoinCondition,
    /// Predicates splice into an eager-load join's ON clause
    IncludeCondition,
}

/// Mutable context carried through a fluent chain
///
/// `initial_alias` is fixed at construction; `current_alias` tracks the
/// deepest relation traversed on the current branch and moves on every
/// join. Eager-load aliases are recorded so the same relation is never
/// joined twice in one chain.
pub(crate) struct QueryState<'p, E: Entity> {
    pub builder: SelectBuilder<E>,
    pub pool: &'p PgPool,
    pub initial_alias: String,
    pub current_alias: String,
    pub visited_includes: HashSet<String>,
    pub clause_mode: ClauseMode,
    pub ops: OperationQueue,
    pub defect: Option<OrmError>,
}

/// Derive the alias a traversed relation materializes under
pub(crate) fn descend(parent_alias: &str, property_name: &str) -> String {
    format!("{}_{}", parent_alias, property_name)
}

impl<'p, E: Entity> QueryState<'p, E> {
    pub fn new(builder: SelectBuilder<E>, pool: &'p PgPool) -> Self {
        let initial_alias = builder.alias().to_string();
        Self {
            builder,
            pool,
            current_alias: initial_alias.clone(),
            initial_alias,
            visited_includes: HashSet::new(),
            clause_mode: ClauseMode::Plain,
            ops: OperationQueue::default(),
            defect: None,
        }
    }

    /// Record a construction-time failure, keeping the first one
    pub fn record(&mut self, outcome: Result<(), OrmError>) {
        if let Err(err) = outcome {
            self.defect.get_or_insert(err);
        }
    }
}
