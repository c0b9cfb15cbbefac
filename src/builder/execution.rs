//! Select builder execution - terminal fetches against the pool

use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres};

use super::SelectBuilder;
use crate::entity::Entity;
use crate::error::OrmResult;

impl<E: Entity> SelectBuilder<E> {
    /// Execute and return at most one entity
    pub async fn get_one(&self, pool: &PgPool) -> OrmResult<Option<E>> {
        let (sql, params) = self.to_sql_with_params();
        tracing::debug!(sql = %sql, params = params.len(), "fetching one");
        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                tracing::error!(sql = %sql, "fetch failed: {}", e);
                e
            })?;
        row.map(|r| E::from_row(&r)).transpose()
    }

    /// Execute and return all matching entities
    pub async fn get_many(&self, pool: &PgPool) -> OrmResult<Vec<E>> {
        let (sql, params) = self.to_sql_with_params();
        tracing::debug!(sql = %sql, params = params.len(), "fetching many");
        let rows = bind_params(sqlx::query(&sql), &params)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                tracing::error!(sql = %sql, "fetch failed: {}", e);
                e
            })?;
        rows.iter().map(E::from_row).collect()
    }
}

/// Bind collected parameter values onto a query in order
pub(crate) fn bind_params<'a>(
    mut query: sqlx::query::Query<'a, Postgres, PgArguments>,
    params: &'a [Value],
) -> sqlx::query::Query<'a, Postgres, PgArguments> {
    for value in params {
        query = bind_value(query, value);
    }
    query
}

/// Bind one JSON value as its closest native Postgres type
pub(crate) fn bind_value<'a>(
    query: sqlx::query::Query<'a, Postgres, PgArguments>,
    value: &Value,
) -> sqlx::query::Query<'a, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(f) = n.as_f64() {
                query.bind(f)
            } else {
                query.bind(n.to_string())
            }
        }
        Value::String(s) => query.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => query.bind(sqlx::types::Json(value.clone())),
    }
}
