//! Chain-level tests over shared test entities
//!
//! Queries are inspected two ways: through the recorded deferred
//! operations, and through the SQL and parameters the builder renders
//! after replay. No live database is required; pools are created lazily
//! and never connected.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::entity::Entity;
use crate::error::OrmResult;
use crate::query::ops::{BuilderMethod, OpArg};
use crate::query::{FetchMode, Many, Query};
use crate::repository::Repository;
use crate::{properties, relations};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    type Id = i64;

    fn table_name() -> &'static str {
        "users"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn from_row(row: &PgRow) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn insert_fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", json!(self.name)),
            ("email", json!(self.email)),
            ("active", json!(self.active)),
        ]
    }
}

properties! { User {
    ID: i64 = "id",
    NAME: String = "name",
    EMAIL: String = "email",
    ACTIVE: bool = "active",
    CREATED_AT: DateTime<Utc> = "created_at",
} }

relations! { User {
    POSTS: has_many(Post, "user_id") = "posts",
} }

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct Post {
    pub id: Option<i64>,
    pub user_id: i64,
    pub title: String,
    pub score: i64,
    pub published: bool,
}

impl Entity for Post {
    type Id = i64;

    fn table_name() -> &'static str {
        "posts"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn from_row(row: &PgRow) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            score: row.try_get("score")?,
            published: row.try_get("published")?,
        })
    }

    fn insert_fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("user_id", json!(self.user_id)),
            ("title", json!(self.title)),
            ("score", json!(self.score)),
            ("published", json!(self.published)),
        ]
    }
}

properties! { Post {
    TITLE: String = "title",
    SCORE: i64 = "score",
    PUBLISHED: bool = "published",
} }

relations! { Post {
    COMMENTS: has_many(Comment, "post_id") = "comments",
    AUTHOR: belongs_to(User, "user_id") = "author",
} }

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct Comment {
    pub id: Option<i64>,
    pub post_id: i64,
    pub body: String,
}

impl Entity for Comment {
    type Id = i64;

    fn table_name() -> &'static str {
        "comments"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn from_row(row: &PgRow) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            post_id: row.try_get("post_id")?,
            body: row.try_get("body")?,
        })
    }

    fn insert_fields(&self) -> Vec<(&'static str, Value)> {
        vec![("post_id", json!(self.post_id)), ("body", json!(self.body))]
    }
}

properties! { Comment {
    BODY: String = "body",
} }

/// A pool that never connects; chains here are built, not fetched
pub(crate) fn test_pool() -> PgPool {
    PgPoolOptions::new()
        .max_lifetime(None)
        .idle_timeout(None)
        .connect_lazy("postgres://localhost:5432/fluent_orm_test")
        .expect("lazy pool")
}

/// Replay a chain's operations and render the resulting SQL
fn render<E, M, P>(query: Query<'_, E, M, P>) -> (String, Vec<Value>)
where
    E: Entity,
    M: FetchMode<E>,
    P: Entity,
{
    let mut state = query.state;
    assert!(state.defect.is_none(), "chain recorded a defect");
    let ops = std::mem::take(&mut state.ops);
    ops.replay(&mut state.builder).expect("replay");
    state.builder.to_sql_with_params()
}

#[test]
fn where_equal_records_parameterized_predicate() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let query = users.get_all().r#where(User::NAME).equal("ann");
    let ops = query.state.ops.ops();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].method, BuilderMethod::Where);
    assert_eq!(
        ops[0].args,
        vec![
            OpArg::Text("entity.name = :value".to_string()),
            OpArg::Binding {
                name: "value".to_string(),
                value: json!("ann"),
            },
        ]
    );
}

#[test]
fn is_true_renders_bound_boolean() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, params) = render(users.get_all().r#where(User::ACTIVE).is_true());
    assert_eq!(
        sql,
        "SELECT entity.* FROM users entity WHERE entity.active = $1"
    );
    assert_eq!(params, vec![json!(true)]);
}

#[test]
fn get_by_id_seeds_the_builder_directly() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let query = users.get_by_id(7);
    assert!(query.state.ops.is_empty());

    let (sql, params) = render(query);
    assert_eq!(sql, "SELECT entity.* FROM users entity WHERE entity.id = $1");
    assert_eq!(params, vec![json!(7)]);
}

#[test]
fn conjunctions_keep_their_own_parameters() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, params) = render(
        users
            .get_all()
            .r#where(User::NAME)
            .equal("ann")
            .or(User::EMAIL)
            .ends_with("@example.com")
            .and(User::ACTIVE)
            .is_true(),
    );
    assert_eq!(
        sql,
        "SELECT entity.* FROM users entity WHERE entity.name = $1 \
         OR entity.email LIKE $2 AND entity.active = $3"
    );
    assert_eq!(params, vec![json!("ann"), json!("%@example.com"), json!(true)]);
}

#[test]
fn string_match_operators_pad_wildcards() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let padded = |query: Query<'_, User, Many>| match &query.state.ops.ops()[0].args[1] {
        OpArg::Binding { value, .. } => value.clone(),
        other => panic!("expected binding, got {other:?}"),
    };

    assert_eq!(
        padded(users.get_all().r#where(User::NAME).begins_with("ab")),
        json!("ab%")
    );
    assert_eq!(
        padded(users.get_all().r#where(User::NAME).ends_with("ab")),
        json!("%ab")
    );
    assert_eq!(
        padded(users.get_all().r#where(User::NAME).contains("ab")),
        json!("%ab%")
    );
}

#[test]
fn null_checks_bind_nothing() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, params) = render(users.get_all().r#where(User::CREATED_AT).is_not_null());
    assert_eq!(
        sql,
        "SELECT entity.* FROM users entity WHERE entity.created_at IS NOT NULL"
    );
    assert!(params.is_empty());
}

#[test]
fn skip_and_take_ignore_non_positive_counts() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    assert!(users.get_all().skip(0).state.ops.is_empty());
    assert!(users.get_all().skip(-5).state.ops.is_empty());
    assert!(users.get_all().take(0).state.ops.is_empty());

    let query = users.get_all().skip(5);
    let ops = query.state.ops.ops();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].method, BuilderMethod::SetFirstResult);
    assert_eq!(ops[0].args, vec![OpArg::Count(5)]);

    let (sql, _) = render(users.get_all().skip(10).take(20));
    assert_eq!(sql, "SELECT entity.* FROM users entity LIMIT 20 OFFSET 10");
}

#[test]
fn then_by_adds_keys_instead_of_replacing() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let query = users
        .get_all()
        .order_by(User::NAME)
        .then_by_descending(User::CREATED_AT);
    assert_eq!(query.state.ops.len(), 2);

    let (sql, _) = render(query);
    assert_eq!(
        sql,
        "SELECT entity.* FROM users entity ORDER BY entity.name ASC, entity.created_at DESC"
    );
}

#[test]
fn repeated_order_by_replaces_at_replay() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, _) = render(
        users
            .get_all()
            .order_by(User::NAME)
            .order_by_descending(User::CREATED_AT),
    );
    assert_eq!(
        sql,
        "SELECT entity.* FROM users entity ORDER BY entity.created_at DESC"
    );
}

#[test]
fn include_joins_and_selects_the_relation() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, _) = render(users.get_all().include(User::POSTS));
    assert_eq!(
        sql,
        "SELECT entity.*, entity_posts.* FROM users entity \
         LEFT JOIN posts entity_posts ON entity_posts.user_id = entity.id"
    );
}

#[test]
fn repeated_include_joins_once() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let query = users
        .get_all()
        .include(User::POSTS)
        .using_base_type()
        .include(User::POSTS);
    assert_eq!(query.state.ops.len(), 1);
    assert_eq!(query.state.current_alias, "entity_posts");
}

#[test]
fn then_include_descends_the_alias_chain() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, _) = render(
        users
            .get_all()
            .include(User::POSTS)
            .then_include(Post::COMMENTS),
    );
    assert_eq!(
        sql,
        "SELECT entity.*, entity_posts.*, entity_posts_comments.* FROM users entity \
         LEFT JOIN posts entity_posts ON entity_posts.user_id = entity.id \
         LEFT JOIN comments entity_posts_comments \
         ON entity_posts_comments.post_id = entity_posts.id"
    );
}

#[test]
fn belongs_to_joins_through_the_local_foreign_key() {
    let pool = test_pool();
    let posts: Repository<Post> = Repository::new(pool);

    let (sql, _) = render(posts.get_all().include(Post::AUTHOR));
    assert_eq!(
        sql,
        "SELECT entity.*, entity_author.* FROM posts entity \
         LEFT JOIN users entity_author ON entity_author.id = entity.user_id"
    );
}

#[test]
fn include_where_splices_conditions_into_the_join() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, params) = render(
        users
            .get_all()
            .include_where(User::POSTS, Post::SCORE)
            .greater_than(10)
            .and(Post::PUBLISHED)
            .is_true(),
    );
    assert_eq!(
        sql,
        "SELECT entity.*, entity_posts.* FROM users entity \
         LEFT JOIN posts entity_posts ON entity_posts.user_id = entity.id \
         AND (entity_posts.score > 10 AND entity_posts.published = true)"
    );
    assert!(params.is_empty(), "join conditions inline their values");
}

#[test]
fn join_condition_strings_are_quoted_and_escaped() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, _) = render(
        users
            .get_all()
            .include_where(User::POSTS, Post::TITLE)
            .equal("it's fine"),
    );
    assert!(
        sql.contains("entity_posts.title = 'it''s fine'"),
        "unexpected sql: {sql}"
    );
}

#[test]
fn where_related_uses_a_filter_only_inner_join() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, params) = render(
        users
            .get_all()
            .where_related(User::POSTS, Post::SCORE)
            .greater_than_or_equal(100),
    );
    assert_eq!(
        sql,
        "SELECT entity.* FROM users entity \
         INNER JOIN posts entity_posts ON entity_posts.user_id = entity.id \
         AND (entity_posts.score >= 100)"
    );
    assert!(params.is_empty());
}

#[test]
fn ordering_after_include_targets_the_joined_alias() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, _) = render(
        users
            .get_all()
            .include(User::POSTS)
            .order_by_descending(Post::SCORE),
    );
    assert!(sql.ends_with("ORDER BY entity_posts.score DESC"), "{sql}");
}

#[test]
fn custom_root_alias_flows_through_the_chain() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, _) = render(users.get_all_as("u").r#where(User::ACTIVE).is_false());
    assert_eq!(sql, "SELECT u.* FROM users u WHERE u.active = $1");
}

#[test]
fn get_one_builds_the_same_chain_shape() {
    let pool = test_pool();
    let users: Repository<User> = Repository::new(pool);

    let (sql, params) = render(users.get_one().r#where(User::EMAIL).equal("a@b.c"));
    assert_eq!(
        sql,
        "SELECT entity.* FROM users entity WHERE entity.email = $1"
    );
    assert_eq!(params, vec![json!("a@b.c")]);
}
