//! Query chain - construction, scope changes, and execution

use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::pin::Pin;

use sqlx::PgPool;

use crate::builder::SelectBuilder;
use crate::entity::Entity;
use crate::error::OrmResult;
use crate::query::state::QueryState;
use crate::query::FetchMode;

/// A fluent query over root entity `E`, resolving to `M`'s output shape
///
/// `P` is the property scope: the entity type subsequent property
/// selectors refer to. It starts as `E` and moves to the target of each
/// traversed relation. The chain performs no I/O until executed, and
/// executing consumes it.
pub struct Query<'p, E: Entity, M: FetchMode<E>, P: Entity = E> {
    pub(crate) state: QueryState<'p, E>,
    pub(crate) _mode: PhantomData<fn() -> (M, P)>,
}

impl<'p, E: Entity, M: FetchMode<E>> Query<'p, E, M> {
    /// Bind a chain to a builder and the pool its terminal fetch will use
    pub fn new(builder: SelectBuilder<E>, pool: &'p PgPool) -> Self {
        Query {
            state: QueryState::new(builder, pool),
            _mode: PhantomData,
        }
    }
}

impl<'p, E: Entity, M: FetchMode<E>, P: Entity> Query<'p, E, M, P> {
    /// Move the property scope to another entity type; state is untouched
    pub(crate) fn rescope<P2: Entity>(self) -> Query<'p, E, M, P2> {
        Query {
            state: self.state,
            _mode: PhantomData,
        }
    }

    /// Rescope property selectors to the root entity type
    pub fn using_base_type(self) -> Query<'p, E, M, E> {
        self.rescope()
    }

    /// Replay the recorded operations and run the terminal fetch
    pub async fn execute(mut self) -> OrmResult<M::Output> {
        if let Some(defect) = self.state.defect.take() {
            return Err(defect);
        }
        let ops = std::mem::take(&mut self.state.ops);
        tracing::debug!(operations = ops.len(), "replaying deferred operations");
        ops.replay(&mut self.state.builder)?;
        M::fetch(&self.state.builder, self.state.pool).await
    }
}

impl<'p, E, M, P> IntoFuture for Query<'p, E, M, P>
where
    E: Entity + 'p,
    M: FetchMode<E> + 'p,
    P: Entity + 'p,
{
    type Output = OrmResult<M::Output>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'p>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
