use argon2::{
    Argon2,
    password_hash::{PasswordHasher as Argon2Hasher, SaltString, rand_core::OsRng},
};

use crate::domain::{
    error::DomainError, models::credential::HashedPassword,
    services::password_service::PasswordHasher,
};

#[derive(Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError> {
        // Validate password strength
        if plain_password.len() < 8 {
            return Err(DomainError::WeakPassword);
        }

        let salt = SaltString::generate(OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|_| DomainError::HashingFailed)?
            .to_string();

        Ok(HashedPassword::new(hash, salt.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_is_rejected() {
        let hasher = Argon2PasswordHasher::new();
        assert!(matches!(
            hasher.hash("short"),
            Err(DomainError::WeakPassword)
        ));
    }

    #[test]
    fn hash_carries_both_hash_and_salt() {
        let hasher = Argon2PasswordHasher::new();
        let credential = hasher.hash("long enough password").unwrap();
        assert!(credential.hash().starts_with("$argon2"));
        assert!(!credential.salt().is_empty());
        assert!(credential.hash().contains(credential.salt()));
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash("long enough password").unwrap();
        let second = hasher.hash("long enough password").unwrap();
        assert_ne!(first.salt(), second.salt());
        assert_ne!(first.hash(), second.hash());
    }
}
