use uuid::Uuid;

use crate::domain::{
    error::DomainError, models::user::User,
    repositories::user_mutation_repository::UserMutationRepository,
};

pub struct DeleteUserUsecase<M: UserMutationRepository> {
    mutation_repository: M,
}

impl<M: UserMutationRepository> DeleteUserUsecase<M> {
    pub fn new(mutation_repository: M) -> Self {
        Self {
            mutation_repository,
        }
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<User, DomainError>
    where
        M: Send + Sync,
    {
        let user = self.mutation_repository.delete_user(id).await?;
        Ok(user)
    }
}
