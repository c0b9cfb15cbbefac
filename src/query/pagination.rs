//! Query pagination - skip and take
//!
//! Zero and negative values record nothing; they are silent no-ops
//! rather than errors.

use crate::entity::Entity;
use crate::query::ops::{BuilderMethod, OpArg};
use crate::query::{FetchMode, Query};

impl<'p, E: Entity, M: FetchMode<E>, P: Entity> Query<'p, E, M, P> {
    /// Skip the first `count` rows
    pub fn skip(mut self, count: i64) -> Self {
        if count > 0 {
            self.state
                .ops
                .push(BuilderMethod::SetFirstResult, vec![OpArg::Count(count)]);
        }
        self
    }

    /// Return at most `count` rows
    pub fn take(mut self, count: i64) -> Self {
        if count > 0 {
            self.state
                .ops
                .push(BuilderMethod::SetMaxResults, vec![OpArg::Count(count)]);
        }
        self
    }
}
