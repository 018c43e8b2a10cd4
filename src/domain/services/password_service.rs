use crate::domain::{error::DomainError, models::credential::HashedPassword};

/// Service producing a `(hash, salt)` credential from a plain text password.
pub trait PasswordHasher: Clone {
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError>;
}
