use uuid::Uuid;

use crate::domain::{
    error::DomainError,
    models::user::{Login, User},
    repositories::user_mutation_repository::{UserChanges, UserMutationRepository},
};

pub struct UpdateUserUsecase<M: UserMutationRepository> {
    mutation_repository: M,
}

impl<M: UserMutationRepository> UpdateUserUsecase<M> {
    pub fn new(mutation_repository: M) -> Self {
        Self {
            mutation_repository,
        }
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        login: String,
        group_id: i32,
    ) -> Result<User, DomainError>
    where
        M: Send + Sync,
    {
        let login = Login::new(login)?;

        let user = self
            .mutation_repository
            .update_user(id, UserChanges { login, group_id })
            .await?;

        Ok(user)
    }
}
