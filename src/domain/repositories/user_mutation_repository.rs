use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    error::MutationError,
    models::{credential::HashedPassword, user::Login, user::User},
};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: Login,
    pub credential: HashedPassword,
    pub group_id: i32,
}

#[derive(Debug, Clone)]
pub struct UserChanges {
    pub login: Login,
    pub group_id: i32,
}

/// Mutation side of the registry. Every method runs as one serializable
/// transaction: guards are evaluated against the transaction's snapshot
/// strictly before the write, and a guard failure aborts the whole unit.
#[async_trait]
pub trait UserMutationRepository {
    /// Insert a new account in the Active state.
    async fn create_user(&self, new_user: NewUser) -> Result<User, MutationError>;

    /// Change an account's login and/or group (promote, demote, rename).
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, MutationError>;

    /// Soft-delete: the account's state becomes Blocked, the row remains.
    async fn delete_user(&self, id: Uuid) -> Result<User, MutationError>;
}
