//! Repository - entry points that start chains and persist entities
//!
//! Read operations hand back a fluent query bound to this repository's
//! pool; write operations run parameterized statements immediately.

use std::marker::PhantomData;

use serde_json::Value;
use sqlx::PgPool;

use crate::builder::execution::bind_value;
use crate::builder::SelectBuilder;
use crate::entity::{Entity, DEFAULT_ALIAS};
use crate::error::{OrmError, OrmResult};
use crate::query::{Many, One, Query};

/// Repository over one entity type
pub struct Repository<E: Entity> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// The pool write operations and terminal fetches run against
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A bare select builder, for callers that bypass the fluent layer
    pub fn select_builder(&self, alias: &str) -> SelectBuilder<E> {
        SelectBuilder::new(alias)
    }

    /// Query all rows
    pub fn get_all(&self) -> Query<'_, E, Many> {
        self.get_all_as(DEFAULT_ALIAS)
    }

    /// Query all rows under a caller-chosen root alias
    pub fn get_all_as(&self, alias: &str) -> Query<'_, E, Many> {
        Query::new(SelectBuilder::new(alias), &self.pool)
    }

    /// Query a single row
    pub fn get_one(&self) -> Query<'_, E, One> {
        self.get_one_as(DEFAULT_ALIAS)
    }

    /// Query a single row under a caller-chosen root alias
    pub fn get_one_as(&self, alias: &str) -> Query<'_, E, One> {
        Query::new(SelectBuilder::new(alias), &self.pool)
    }

    /// Query the row with the given id
    pub fn get_by_id(&self, id: E::Id) -> Query<'_, E, One> {
        let mut builder = SelectBuilder::new(DEFAULT_ALIAS);
        builder.where_condition(
            format!("{}.{} = :id", DEFAULT_ALIAS, E::id_column()),
            Some(("id".to_string(), id.into())),
        );
        Query::new(builder, &self.pool)
    }

    /// Insert an entity, ignoring any id it carries
    pub async fn create_one(&self, mut entity: E) -> OrmResult<E> {
        entity.set_id(None);
        self.persist_one(entity).await
    }

    /// Insert entities, ignoring any ids they carry
    pub async fn create_many(&self, entities: Vec<E>) -> OrmResult<Vec<E>> {
        let mut created = Vec::with_capacity(entities.len());
        for mut entity in entities {
            entity.set_id(None);
            created.push(self.persist_one(entity).await?);
        }
        Ok(created)
    }

    /// Insert when the entity has no id, update when it has one
    pub async fn persist_one(&self, entity: E) -> OrmResult<E> {
        match entity.id() {
            Some(id) => self.update(entity, id).await,
            None => self.insert(entity).await,
        }
    }

    /// Persist entities one by one, in order
    pub async fn persist_many(&self, entities: Vec<E>) -> OrmResult<Vec<E>> {
        let mut persisted = Vec::with_capacity(entities.len());
        for entity in entities {
            persisted.push(self.persist_one(entity).await?);
        }
        Ok(persisted)
    }

    /// Delete the entity's row; the entity must carry an id
    pub async fn remove_one(&self, entity: E) -> OrmResult<E> {
        let id = entity.id().ok_or(OrmError::MissingId)?;
        let sql = delete_statement::<E>();
        tracing::debug!(sql = %sql, table = E::table_name(), "deleting");
        bind_value(sqlx::query(&sql), &id.into())
            .execute(&self.pool)
            .await?;
        Ok(entity)
    }

    /// Delete each entity's row, in order
    pub async fn remove_many(&self, entities: Vec<E>) -> OrmResult<Vec<E>> {
        let mut removed = Vec::with_capacity(entities.len());
        for entity in entities {
            removed.push(self.remove_one(entity).await?);
        }
        Ok(removed)
    }

    async fn insert(&self, entity: E) -> OrmResult<E> {
        let fields = entity.insert_fields();
        let sql = insert_statement::<E>(&fields);
        tracing::debug!(sql = %sql, table = E::table_name(), "inserting");
        let mut query = sqlx::query(&sql);
        for (_, value) in &fields {
            query = bind_value(query, value);
        }
        let row = query.fetch_one(&self.pool).await?;
        E::from_row(&row)
    }

    async fn update(&self, entity: E, id: E::Id) -> OrmResult<E> {
        let fields = entity.insert_fields();
        if fields.is_empty() {
            return Ok(entity);
        }
        let sql = update_statement::<E>(&fields);
        tracing::debug!(sql = %sql, table = E::table_name(), "updating");
        let mut query = sqlx::query(&sql);
        for (_, value) in &fields {
            query = bind_value(query, value);
        }
        query = bind_value(query, &id.into());
        let row = query.fetch_one(&self.pool).await?;
        E::from_row(&row)
    }
}

fn insert_statement<E: Entity>(fields: &[(&'static str, Value)]) -> String {
    if fields.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES RETURNING *", E::table_name());
    }
    let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
    let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        E::table_name(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_statement<E: Entity>(fields: &[(&'static str, Value)]) -> String {
    let assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
        E::table_name(),
        assignments.join(", "),
        E::id_column(),
        fields.len() + 1
    )
}

fn delete_statement<E: Entity>() -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        E::table_name(),
        E::id_column()
    )
}
