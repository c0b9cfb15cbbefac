//! Query predicate starters - where/and/or and their join-filter forms
//!
//! A starter records the column expression a completion call will later
//! amend. Plain starters attach to the root alias; related starters
//! materialize a filter-only inner join and build its ON clause instead.
//! While an eager-load ON clause is open, `and`/`or` splice into it
//! rather than starting a new WHERE condition.

use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::fields::{Property, Relation};
use crate::query::comparable::ComparableQuery;
use crate::query::ops::{BuilderMethod, DeferredOp, OpArg};
use crate::query::state::{descend, ClauseMode};
use crate::query::{FetchMode, Query};

impl<'p, E: Entity, M: FetchMode<E>, P: Entity> Query<'p, E, M, P> {
    /// Start a predicate on a root-entity property
    pub fn r#where<V>(mut self, property: Property<E, V>) -> ComparableQuery<'p, E, M, E, V> {
        let fragment = format!("{}.{}", self.state.initial_alias, property.name());
        self.state
            .ops
            .push(BuilderMethod::Where, vec![OpArg::Text(fragment)]);
        self.state.clause_mode = ClauseMode::Plain;
        ComparableQuery::new(self.rescope())
    }

    /// Start a predicate on a related entity's property, joining the
    /// relation with a filter-only inner join
    pub fn where_related<S: Entity, V>(
        mut self,
        relation: Relation<P, S>,
        property: Property<S, V>,
    ) -> ComparableQuery<'p, E, M, P, V> {
        self.state.clause_mode = ClauseMode::JoinCondition;
        self.start_join_condition(relation, property.name());
        ComparableQuery::new(self)
    }

    /// Continue with a conjunctive predicate
    pub fn and<V>(mut self, property: Property<P, V>) -> ComparableQuery<'p, E, M, P, V> {
        self.continue_predicate(BuilderMethod::AndWhere, "AND", property.name());
        ComparableQuery::new(self)
    }

    /// Continue with a conjunctive predicate on a related entity's property
    pub fn and_related<S: Entity, V>(
        mut self,
        relation: Relation<P, S>,
        property: Property<S, V>,
    ) -> ComparableQuery<'p, E, M, P, V> {
        self.state.clause_mode = ClauseMode::JoinCondition;
        self.start_join_condition(relation, property.name());
        ComparableQuery::new(self)
    }

    /// Continue with a disjunctive predicate
    pub fn or<V>(mut self, property: Property<P, V>) -> ComparableQuery<'p, E, M, P, V> {
        self.continue_predicate(BuilderMethod::OrWhere, "OR", property.name());
        ComparableQuery::new(self)
    }

    /// Continue with a disjunctive predicate on a related entity's property
    pub fn or_related<S: Entity, V>(
        mut self,
        relation: Relation<P, S>,
        property: Property<S, V>,
    ) -> ComparableQuery<'p, E, M, P, V> {
        self.state.clause_mode = ClauseMode::JoinCondition;
        self.start_join_condition(relation, property.name());
        ComparableQuery::new(self)
    }

    fn continue_predicate(&mut self, method: BuilderMethod, conjunction: &str, name: &str) {
        if self.state.clause_mode == ClauseMode::IncludeCondition {
            let outcome = self
                .state
                .ops
                .amend_last(|op| splice_join_condition(op, conjunction, name));
            self.state.record(outcome);
        } else {
            let fragment = format!("{}.{}", self.state.initial_alias, name);
            self.state.ops.push(method, vec![OpArg::Text(fragment)]);
        }
    }

    /// Join a relation off the current alias and open its ON clause
    fn start_join_condition<PE: Entity, S: Entity>(
        &mut self,
        relation: Relation<PE, S>,
        condition_property: &str,
    ) {
        let parent_alias = self.state.current_alias.clone();
        let join_alias = descend(&parent_alias, relation.name());
        self.state.current_alias = join_alias.clone();

        let method = if self.state.clause_mode == ClauseMode::IncludeCondition {
            BuilderMethod::LeftJoinAndSelect
        } else {
            BuilderMethod::InnerJoin
        };
        let source = relation.join_source(&parent_alias, &join_alias);
        let condition = format!("{}.{}", join_alias, condition_property);
        self.state.ops.push(
            method,
            vec![
                OpArg::Join(source),
                OpArg::Text(join_alias),
                OpArg::Text(condition),
            ],
        );
    }
}

/// Extend an open join ON clause with `<conjunction> <alias>.<property>`
fn splice_join_condition(op: &mut DeferredOp, conjunction: &str, name: &str) -> OrmResult<()> {
    let condition = op.pop_text()?;
    let alias = match op.args.last() {
        Some(OpArg::Text(alias)) => alias.clone(),
        _ => {
            return Err(OrmError::Typestate(
                "no join alias to attach the condition to".to_string(),
            ))
        }
    };
    op.args.push(OpArg::Text(format!(
        "{} {} {}.{}",
        condition, conjunction, alias, name
    )));
    Ok(())
}
