//! Error types for query construction and execution
//!
//! Construction-time failures (property resolution, clause sequencing)
//! surface synchronously at the offending call; engine failures surface
//! when the terminal fetch is awaited. Nothing is retried or swallowed.

/// Result type alias for all fallible operations in this crate
pub type OrmResult<T> = Result<T, OrmError>;

/// Error taxonomy for the query layer
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    /// A property reference could not be resolved to a simple member name
    #[error("cannot resolve '{0}' as a property name")]
    Resolution(String),

    /// A predicate was completed or spliced without a pending clause to attach to
    #[error("clause built out of order: {0}")]
    Typestate(String),

    /// Failure raised by the underlying engine during replay or terminal fetch
    #[error("engine error: {0}")]
    Engine(#[from] sqlx::Error),

    /// Connection pool setup or acquisition failure
    #[error("connection error: {0}")]
    Connection(String),

    /// Row or parameter (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persistence operation required an id the entity does not carry
    #[error("entity has no id assigned")]
    MissingId,
}
