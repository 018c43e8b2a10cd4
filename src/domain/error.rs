use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Mutation failed: {0}")]
    Mutation(#[from] MutationError),

    #[error("Weak password (minimum 8 characters required)")]
    WeakPassword,

    #[error("Password hashing failed")]
    HashingFailed,

    #[error("Empty login")]
    EmptyLogin,
}

/// Outcome taxonomy of the transactional mutation paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("Unknown user group")]
    UnknownGroup,

    #[error("The admin group is already occupied")]
    AdminOccupied,

    #[error("This login was registered too recently")]
    LoginThrottled,

    #[error("User not found")]
    NotFound,

    #[error("Conflicting concurrent update")]
    Conflict,

    #[error("Database error: {0}")]
    Database(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for MutationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => MutationError::NotFound,
            RepositoryError::DatabaseError(message) => MutationError::Database(message),
        }
    }
}
