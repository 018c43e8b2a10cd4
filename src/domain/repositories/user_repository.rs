use crate::domain::{error::RepositoryError, models::user::User};
use async_trait::async_trait;
use uuid::Uuid;

/// Read side of the registry. Blocked accounts are invisible here.
#[async_trait]
pub trait UserRepository {
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    async fn list_active(&self) -> Result<Vec<User>, RepositoryError>;
}
