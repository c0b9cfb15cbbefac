//! Predicate completion - the operations legal while a clause is open
//!
//! A `ComparableQuery` exists only between a predicate starter and its
//! completion, so completing out of order is unrepresentable through the
//! public surface. Completion amends the starter recorded last: plain
//! predicates get `" <op> :value"` plus a named parameter binding; open
//! join ON clauses get the operator and the value inlined as a SQL
//! literal, with single quotes escaped for strings.

use std::marker::PhantomData;

use serde_json::Value;

use crate::entity::Entity;
use crate::query::ops::OpArg;
use crate::query::state::ClauseMode;
use crate::query::{FetchMode, Query};

/// Parameter name predicates bind under; rewritten to a positional slot
/// per condition at render time
const PARAM: &str = "value";

/// A query with one predicate open, awaiting its comparison
pub struct ComparableQuery<'p, E: Entity, M: FetchMode<E>, P: Entity, V> {
    query: Query<'p, E, M, P>,
    _value: PhantomData<fn() -> V>,
}

impl<'p, E: Entity, M: FetchMode<E>, P: Entity, V> ComparableQuery<'p, E, M, P, V> {
    pub(crate) fn new(query: Query<'p, E, M, P>) -> Self {
        Self {
            query,
            _value: PhantomData,
        }
    }

    /// Complete with `IS NULL`; no value is bound
    pub fn is_null(self) -> Query<'p, E, M, P> {
        self.complete_unbound("IS NULL")
    }

    /// Complete with `IS NOT NULL`; no value is bound
    pub fn is_not_null(self) -> Query<'p, E, M, P> {
        self.complete_unbound("IS NOT NULL")
    }

    fn complete(mut self, operator: &str, value: Value) -> Query<'p, E, M, P> {
        let mode = self.query.state.clause_mode;
        let outcome = self.query.state.ops.amend_last(|op| {
            let fragment = op.pop_text()?;
            if mode == ClauseMode::Plain {
                op.args
                    .push(OpArg::Text(format!("{} {} :{}", fragment, operator, PARAM)));
                op.args.push(OpArg::Binding {
                    name: PARAM.to_string(),
                    value,
                });
            } else {
                op.args.push(OpArg::Text(format!(
                    "{} {} {}",
                    fragment,
                    operator,
                    sql_literal(&value)
                )));
            }
            Ok(())
        });
        self.query.state.record(outcome);
        self.query
    }

    fn complete_unbound(mut self, suffix: &str) -> Query<'p, E, M, P> {
        let outcome = self.query.state.ops.amend_last(|op| {
            let fragment = op.pop_text()?;
            op.args.push(OpArg::Text(format!("{} {}", fragment, suffix)));
            Ok(())
        });
        self.query.state.record(outcome);
        self.query
    }
}

impl<'p, E: Entity, M: FetchMode<E>, P: Entity, V: Into<Value>> ComparableQuery<'p, E, M, P, V> {
    /// Complete with `=`
    pub fn equal(self, value: impl Into<V>) -> Query<'p, E, M, P> {
        self.complete("=", value.into().into())
    }

    /// Complete with `!=`
    pub fn not_equal(self, value: impl Into<V>) -> Query<'p, E, M, P> {
        self.complete("!=", value.into().into())
    }

    /// Complete with `>`
    pub fn greater_than(self, value: impl Into<V>) -> Query<'p, E, M, P> {
        self.complete(">", value.into().into())
    }

    /// Complete with `>=`
    pub fn greater_than_or_equal(self, value: impl Into<V>) -> Query<'p, E, M, P> {
        self.complete(">=", value.into().into())
    }

    /// Complete with `<`
    pub fn less_than(self, value: impl Into<V>) -> Query<'p, E, M, P> {
        self.complete("<", value.into().into())
    }

    /// Complete with `<=`
    pub fn less_than_or_equal(self, value: impl Into<V>) -> Query<'p, E, M, P> {
        self.complete("<=", value.into().into())
    }
}

impl<'p, E: Entity, M: FetchMode<E>, P: Entity> ComparableQuery<'p, E, M, P, String> {
    /// Complete with `LIKE '%value%'`
    pub fn contains(self, value: impl Into<String>) -> Query<'p, E, M, P> {
        self.complete("LIKE", Value::String(format!("%{}%", value.into())))
    }

    /// Complete with `LIKE 'value%'`
    pub fn begins_with(self, value: impl Into<String>) -> Query<'p, E, M, P> {
        self.complete("LIKE", Value::String(format!("{}%", value.into())))
    }

    /// Complete with `LIKE '%value'`
    pub fn ends_with(self, value: impl Into<String>) -> Query<'p, E, M, P> {
        self.complete("LIKE", Value::String(format!("%{}", value.into())))
    }
}

impl<'p, E: Entity, M: FetchMode<E>, P: Entity> ComparableQuery<'p, E, M, P, bool> {
    /// Complete with `= true`
    pub fn is_true(self) -> Query<'p, E, M, P> {
        self.complete("=", Value::Bool(true))
    }

    /// Complete with `= false`
    pub fn is_false(self) -> Query<'p, E, M, P> {
        self.complete("=", Value::Bool(false))
    }
}

/// Render a value as an inline SQL literal for join ON clauses
fn sql_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "NULL".to_string(),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}
