//! Query ordering - single and additive sort keys
//!
//! Sort keys resolve against the current alias, so ordering after an
//! include sorts by the included relation's columns.

use crate::builder::OrderDirection;
use crate::entity::Entity;
use crate::fields::Property;
use crate::query::ops::{BuilderMethod, OpArg};
use crate::query::{FetchMode, Query};

impl<'p, E: Entity, M: FetchMode<E>, P: Entity> Query<'p, E, M, P> {
    /// Sort ascending, replacing any prior ordering at execution time
    pub fn order_by<V>(self, property: Property<P, V>) -> Self {
        self.push_order(BuilderMethod::OrderBy, OrderDirection::Asc, property.name())
    }

    /// Sort descending, replacing any prior ordering at execution time
    pub fn order_by_descending<V>(self, property: Property<P, V>) -> Self {
        self.push_order(BuilderMethod::OrderBy, OrderDirection::Desc, property.name())
    }

    /// Add a subordinate ascending sort key
    pub fn then_by<V>(self, property: Property<P, V>) -> Self {
        self.push_order(
            BuilderMethod::AddOrderBy,
            OrderDirection::Asc,
            property.name(),
        )
    }

    /// Add a subordinate descending sort key
    pub fn then_by_descending<V>(self, property: Property<P, V>) -> Self {
        self.push_order(
            BuilderMethod::AddOrderBy,
            OrderDirection::Desc,
            property.name(),
        )
    }

    fn push_order(mut self, method: BuilderMethod, direction: OrderDirection, name: &str) -> Self {
        let column = format!("{}.{}", self.state.current_alias, name);
        self.state
            .ops
            .push(method, vec![OpArg::Text(column), OpArg::Direction(direction)]);
        self
    }
}
