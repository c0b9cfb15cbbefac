//! Deferred operations - the recorded query-mutation steps
//!
//! Every fluent call appends one operation; predicate completion and
//! join-condition splicing amend the most recently appended one. Nothing
//! touches the builder until [`OperationQueue::replay`] applies the whole
//! list in recorded order.

use serde_json::Value;

use crate::builder::{JoinSource, OrderDirection, SelectBuilder};
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};

/// Builder method a deferred operation is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuilderMethod {
    Where,
    AndWhere,
    OrWhere,
    InnerJoin,
    LeftJoinAndSelect,
    OrderBy,
    AddOrderBy,
    SetFirstResult,
    SetMaxResults,
}

/// One argument of a deferred operation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OpArg {
    Text(String),
    Binding { name: String, value: Value },
    Join(JoinSource),
    Direction(OrderDirection),
    Count(i64),
}

/// A recorded (builder method, arguments) pair
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DeferredOp {
    pub method: BuilderMethod,
    pub args: Vec<OpArg>,
}

impl DeferredOp {
    /// Remove and return the trailing argument if it is text
    pub fn pop_text(&mut self) -> OrmResult<String> {
        match self.args.pop() {
            Some(OpArg::Text(text)) => Ok(text),
            other => {
                if let Some(arg) = other {
                    self.args.push(arg);
                }
                Err(OrmError::Typestate(
                    "no pending clause text to amend".to_string(),
                ))
            }
        }
    }
}

/// Ordered list of deferred operations
#[derive(Debug, Default)]
pub(crate) struct OperationQueue {
    ops: Vec<DeferredOp>,
}

impl OperationQueue {
    pub fn push(&mut self, method: BuilderMethod, args: Vec<OpArg>) {
        self.ops.push(DeferredOp { method, args });
    }

    /// Amend the most recently appended operation
    pub fn amend_last<R>(
        &mut self,
        amend: impl FnOnce(&mut DeferredOp) -> OrmResult<R>,
    ) -> OrmResult<R> {
        let op = self.ops.last_mut().ok_or_else(|| {
            OrmError::Typestate("predicate completed before any clause was started".to_string())
        })?;
        amend(op)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[cfg(test)]
    pub fn ops(&self) -> &[DeferredOp] {
        &self.ops
    }

    /// Apply every recorded operation to the builder, in order
    pub fn replay<E: Entity>(self, builder: &mut SelectBuilder<E>) -> OrmResult<()> {
        for op in self.ops {
            apply(op, builder)?;
        }
        Ok(())
    }
}

fn apply<E: Entity>(op: DeferredOp, builder: &mut SelectBuilder<E>) -> OrmResult<()> {
    let method = op.method;
    let mut args = op.args.into_iter();
    match method {
        BuilderMethod::Where | BuilderMethod::AndWhere | BuilderMethod::OrWhere => {
            let fragment = match args.next() {
                Some(OpArg::Text(text)) => text,
                _ => return Err(malformed(method)),
            };
            let binding = match args.next() {
                Some(OpArg::Binding { name, value }) => Some((name, value)),
                None => None,
                Some(_) => return Err(malformed(method)),
            };
            match method {
                BuilderMethod::Where => builder.where_condition(fragment, binding),
                BuilderMethod::AndWhere => builder.and_where(fragment, binding),
                _ => builder.or_where(fragment, binding),
            }
        }
        BuilderMethod::InnerJoin | BuilderMethod::LeftJoinAndSelect => {
            let (source, alias) = match (args.next(), args.next()) {
                (Some(OpArg::Join(source)), Some(OpArg::Text(alias))) => (source, alias),
                _ => return Err(malformed(method)),
            };
            let extra = match args.next() {
                Some(OpArg::Text(condition)) => Some(condition),
                None => None,
                Some(_) => return Err(malformed(method)),
            };
            match method {
                BuilderMethod::InnerJoin => builder.inner_join(source, alias, extra),
                _ => builder.left_join_and_select(source, alias, extra),
            }
        }
        BuilderMethod::OrderBy | BuilderMethod::AddOrderBy => {
            let (column, direction) = match (args.next(), args.next()) {
                (Some(OpArg::Text(column)), Some(OpArg::Direction(direction))) => {
                    (column, direction)
                }
                _ => return Err(malformed(method)),
            };
            match method {
                BuilderMethod::OrderBy => builder.order_by(column, direction),
                _ => builder.add_order_by(column, direction),
            }
        }
        BuilderMethod::SetFirstResult | BuilderMethod::SetMaxResults => {
            let count = match args.next() {
                Some(OpArg::Count(count)) => count,
                _ => return Err(malformed(method)),
            };
            match method {
                BuilderMethod::SetFirstResult => builder.set_first_result(count),
                _ => builder.set_max_results(count),
            }
        }
    }
    if args.next().is_some() {
        return Err(malformed(method));
    }
    Ok(())
}

fn malformed(method: BuilderMethod) -> OrmError {
    OrmError::Typestate(format!("malformed arguments for {:?}", method))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amend_without_a_pending_operation_fails() {
        let mut queue = OperationQueue::default();
        let err = queue.amend_last(|_| Ok(())).unwrap_err();
        assert!(matches!(err, OrmError::Typestate(_)));
    }

    #[test]
    fn pop_text_leaves_non_text_arguments_in_place() {
        let mut op = DeferredOp {
            method: BuilderMethod::SetMaxResults,
            args: vec![OpArg::Count(5)],
        };
        assert!(op.pop_text().is_err());
        assert_eq!(op.args, vec![OpArg::Count(5)]);
    }

    #[test]
    fn replay_preserves_recorded_order() {
        use crate::builder::{OrderDirection, SelectBuilder};
        use crate::tests::User;

        let mut queue = OperationQueue::default();
        queue.push(
            BuilderMethod::Where,
            vec![OpArg::Text("entity.active = true".to_string())],
        );
        queue.push(
            BuilderMethod::OrderBy,
            vec![
                OpArg::Text("entity.name".to_string()),
                OpArg::Direction(OrderDirection::Asc),
            ],
        );
        queue.push(BuilderMethod::SetMaxResults, vec![OpArg::Count(3)]);

        let mut builder = SelectBuilder::<User>::new("entity");
        queue.replay(&mut builder).unwrap();
        assert_eq!(
            builder.to_sql(),
            "SELECT entity.* FROM users entity WHERE entity.active = true \
             ORDER BY entity.name ASC LIMIT 3"
        );
    }
}
