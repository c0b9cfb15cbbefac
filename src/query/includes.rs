//! Query eager loading - include/thenInclude and their filtered forms
//!
//! Includes materialize an eager-load join whose columns are selected
//! into the result shape. An alias already materialized earlier in the
//! chain is never joined again; re-traversal only moves the current
//! alias so deeper selectors keep resolving correctly.

use crate::entity::Entity;
use crate::fields::{Property, Relation};
use crate::query::comparable::ComparableQuery;
use crate::query::ops::{BuilderMethod, OpArg};
use crate::query::state::{descend, ClauseMode};
use crate::query::{FetchMode, Query};

impl<'p, E: Entity, M: FetchMode<E>, P: Entity> Query<'p, E, M, P> {
    /// Eager-load a root-entity relation
    pub fn include<S: Entity>(self, relation: Relation<E, S>) -> Query<'p, E, M, S> {
        let base = self.state.initial_alias.clone();
        self.include_from(relation, base, None)
    }

    /// Eager-load a relation of the entity traversed last
    pub fn then_include<S: Entity>(self, relation: Relation<P, S>) -> Query<'p, E, M, S> {
        let base = self.state.current_alias.clone();
        self.include_from(relation, base, None)
    }

    /// Eager-load a root-entity relation and open a condition on its ON clause
    pub fn include_where<S: Entity, V>(
        self,
        relation: Relation<E, S>,
        property: Property<S, V>,
    ) -> ComparableQuery<'p, E, M, S, V> {
        let base = self.state.initial_alias.clone();
        let query = self.include_from(relation, base, Some(property.name()));
        ComparableQuery::new(query)
    }

    /// Eager-load a relation of the entity traversed last and open a
    /// condition on its ON clause
    pub fn then_include_where<S: Entity, V>(
        self,
        relation: Relation<P, S>,
        property: Property<S, V>,
    ) -> ComparableQuery<'p, E, M, S, V> {
        let base = self.state.current_alias.clone();
        let query = self.include_from(relation, base, Some(property.name()));
        ComparableQuery::new(query)
    }

    /// Join an eager-load relation under `base_alias` unless its alias is
    /// already materialized; always advance the current alias
    fn include_from<PE: Entity, S: Entity>(
        mut self,
        relation: Relation<PE, S>,
        base_alias: String,
        condition_property: Option<&str>,
    ) -> Query<'p, E, M, S> {
        let join_alias = descend(&base_alias, relation.name());
        self.state.current_alias = join_alias.clone();

        if self.state.visited_includes.insert(join_alias.clone()) {
            let source = relation.join_source(&base_alias, &join_alias);
            let mut args = vec![OpArg::Join(source), OpArg::Text(join_alias)];
            if let Some(name) = condition_property {
                self.state.clause_mode = ClauseMode::IncludeCondition;
                args.push(OpArg::Text(format!(
                    "{}.{}",
                    self.state.current_alias, name
                )));
            }
            self.state.ops.push(BuilderMethod::LeftJoinAndSelect, args);
        } else if let Some(name) = condition_property {
            // Relation already joined: attach the condition as a plain
            // predicate on the existing alias instead of a second join.
            self.state.clause_mode = ClauseMode::Plain;
            let fragment = format!("{}.{}", join_alias, name);
            self.state
                .ops
                .push(BuilderMethod::AndWhere, vec![OpArg::Text(fragment)]);
        }
        self.rescope()
    }
}
