use serde::{Deserialize, Serialize};

/// Value object carrying an externally produced password hash and its salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword {
    hash: String,
    salt: String,
}

impl HashedPassword {
    pub fn new(hash: String, salt: String) -> Self {
        Self { hash, salt }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }
}
