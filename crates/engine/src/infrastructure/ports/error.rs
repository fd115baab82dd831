use thiserror::Error;

/// Errors surfaced by repository and ledger implementations.
///
/// Use cases translate these into their own error types; handlers never
/// see a `RepoError` directly.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("database error during {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A uniqueness rule rejected the write (duplicate email, a second
    /// active run, a replayed attempt insert).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// An optimistic guard matched zero rows: the row changed under us
    /// or a balance/quantity check failed inside the statement.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepoError {
    pub fn not_found(entity_type: impl ToString, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn database(operation: impl ToString, message: impl ToString) -> Self {
        Self::Database {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn duplicate(message: impl ToString) -> Self {
        Self::Duplicate(message.to_string())
    }

    pub fn conflict(message: impl ToString) -> Self {
        Self::Conflict(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
