//! Typed property and relation tokens
//!
//! Property references are compile-time tokens carrying the column name
//! and the referenced Rust types, generated per entity by the
//! [`properties!`](crate::properties) and [`relations!`](crate::relations)
//! macros. Resolution never inspects values at runtime; the dynamic
//! escape hatch ([`Property::parse`]) validates that a name is a single
//! simple identifier and fails loudly otherwise.

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::builder::JoinSource;
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};

/// A typed reference to the property named `name` on entity `E`, of value type `V`
pub struct Property<E, V> {
    name: Cow<'static, str>,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> Property<E, V> {
    /// Construct a token for a statically known column name
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _marker: PhantomData,
        }
    }

    /// Resolve a runtime string into a property token
    ///
    /// Accepts one simple member name only; paths, expressions, and
    /// anything that is not a plain identifier are rejected.
    pub fn parse(name: &str) -> OrmResult<Self> {
        validate_member_name(name)?;
        Ok(Self {
            name: Cow::Owned(name.to_string()),
            _marker: PhantomData,
        })
    }

    /// The resolved column name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<E, V> Clone for Property<E, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E, V> std::fmt::Debug for Property<E, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Property").field(&self.name).finish()
    }
}

/// How a relation's rows connect to the owning entity's rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The target table carries a foreign key back to `E`
    HasMany,
    /// As `HasMany`, with at most one matching row
    HasOne,
    /// `E` carries the foreign key to the target table
    BelongsTo,
}

/// A typed reference to the relation named `name` from entity `E` to entity `T`
pub struct Relation<E, T> {
    name: &'static str,
    kind: RelationKind,
    foreign_key: &'static str,
    _marker: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Relation<E, T> {
    /// A one-to-many relation; `foreign_key` lives on the target table
    pub const fn has_many(name: &'static str, foreign_key: &'static str) -> Self {
        Self::with_kind(name, RelationKind::HasMany, foreign_key)
    }

    /// A one-to-one relation; `foreign_key` lives on the target table
    pub const fn has_one(name: &'static str, foreign_key: &'static str) -> Self {
        Self::with_kind(name, RelationKind::HasOne, foreign_key)
    }

    /// An inverse relation; `foreign_key` lives on `E` itself
    pub const fn belongs_to(name: &'static str, foreign_key: &'static str) -> Self {
        Self::with_kind(name, RelationKind::BelongsTo, foreign_key)
    }

    const fn with_kind(name: &'static str, kind: RelationKind, foreign_key: &'static str) -> Self {
        Self {
            name,
            kind,
            foreign_key,
            _marker: PhantomData,
        }
    }

    /// The relation's property name, used for alias derivation
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The relation kind
    pub fn kind(&self) -> RelationKind {
        self.kind
    }
}

impl<E: Entity, T: Entity> Relation<E, T> {
    /// Resolve this relation into a join source for the given alias pair
    pub(crate) fn join_source(&self, parent_alias: &str, join_alias: &str) -> JoinSource {
        let on = match self.kind {
            RelationKind::HasMany | RelationKind::HasOne => format!(
                "{}.{} = {}.{}",
                join_alias,
                self.foreign_key,
                parent_alias,
                E::id_column()
            ),
            RelationKind::BelongsTo => format!(
                "{}.{} = {}.{}",
                join_alias,
                T::id_column(),
                parent_alias,
                self.foreign_key
            ),
        };
        JoinSource {
            path: format!("{}.{}", parent_alias, self.name),
            table: T::table_name(),
            on,
        }
    }
}

impl<E, T> Clone for Relation<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Relation<E, T> {}

impl<E, T> std::fmt::Debug for Relation<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("foreign_key", &self.foreign_key)
            .finish()
    }
}

/// Validate that a name is one plain SQL identifier
///
/// Postgres caps identifiers at 63 bytes; everything longer, empty,
/// non-alphanumeric, or digit-leading is a resolution failure.
fn validate_member_name(name: &str) -> OrmResult<()> {
    if name.is_empty() {
        return Err(OrmError::Resolution("empty name".to_string()));
    }
    if name.len() > 63 {
        return Err(OrmError::Resolution(format!("'{}' is too long", name)));
    }
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(OrmError::Resolution(format!(
            "'{}' starts with a digit",
            name
        )));
    }
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(OrmError::Resolution(format!(
                "'{}' contains invalid character '{}'",
                name, c
            )));
        }
    }
    Ok(())
}

/// Generate the property tokens for an entity's columns
///
/// ```ignore
/// properties! { User {
///     ID: i64 = "id",
///     NAME: String = "name",
/// } }
/// ```
#[macro_export]
macro_rules! properties {
    ($entity:ty { $( $cname:ident : $vty:ty = $column:literal ),* $(,)? }) => {
        impl $entity {
            $(
                pub const $cname: $crate::fields::Property<$entity, $vty> =
                    $crate::fields::Property::new($column);
            )*
        }
    };
}

/// Generate the relation tokens for an entity
///
/// ```ignore
/// relations! { User {
///     POSTS: has_many(Post, "user_id") = "posts",
/// } }
/// ```
#[macro_export]
macro_rules! relations {
    ($entity:ty { $( $cname:ident : $kind:ident($target:ty, $fk:literal) = $name:literal ),* $(,)? }) => {
        impl $entity {
            $(
                pub const $cname: $crate::fields::Relation<$entity, $target> =
                    $crate::fields::Relation::$kind($name, $fk);
            )*
        }
    };
}
