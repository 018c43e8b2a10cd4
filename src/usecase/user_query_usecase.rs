use uuid::Uuid;

use crate::domain::{
    error::{DomainError, RepositoryError},
    models::user::User,
    repositories::user_repository::UserRepository,
};

pub struct UserQueryUsecase<U: UserRepository> {
    user_repository: U,
}

impl<U: UserRepository> UserQueryUsecase<U> {
    pub fn new(user_repository: U) -> Self {
        Self { user_repository }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError>
    where
        U: Send + Sync,
    {
        let user = self
            .user_repository
            .find_active_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError>
    where
        U: Send + Sync,
    {
        let users = self.user_repository.list_active().await?;
        Ok(users)
    }
}
