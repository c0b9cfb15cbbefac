//! Select builder types - conditions, joins, ordering

use std::fmt;

use serde_json::Value;

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// How a condition chains onto the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conjunction::And => write!(f, "AND"),
            Conjunction::Or => write!(f, "OR"),
        }
    }
}

/// One WHERE fragment with its optional named parameter
///
/// The fragment keeps the `:name` placeholder it was recorded with;
/// positional rewriting happens at render time, one slot per condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub conjunction: Conjunction,
    pub fragment: String,
    pub binding: Option<(String, Value)>,
}

/// Join flavor: filter-only inner join, or eager-load join whose columns
/// are selected into the result shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftSelect,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::LeftSelect => write!(f, "LEFT JOIN"),
        }
    }
}

/// A relation resolved against a concrete alias pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSource {
    /// Property path, e.g. `entity.posts`
    pub path: String,
    /// Target table name
    pub table: &'static str,
    /// Foreign-key match between the joined alias and its parent
    pub on: String,
}

/// A join recorded on the builder
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub path: String,
    pub table: &'static str,
    pub alias: String,
    pub on: String,
    /// Extra ON condition spliced in by the query layer, already rendered
    pub extra: Option<String>,
}
