use crate::domain::{
    error::DomainError,
    models::user::{Login, User},
    repositories::user_mutation_repository::{NewUser, UserMutationRepository},
    services::password_service::PasswordHasher,
};

pub struct RegisterUserUsecase<M: UserMutationRepository, P: PasswordHasher> {
    mutation_repository: M,
    password_hasher: P,
}

impl<M: UserMutationRepository, P: PasswordHasher> RegisterUserUsecase<M, P> {
    pub fn new(mutation_repository: M, password_hasher: P) -> Self {
        Self {
            mutation_repository,
            password_hasher,
        }
    }

    pub async fn create_user(
        &self,
        login: String,
        password: String,
        group_id: i32,
    ) -> Result<User, DomainError>
    where
        M: Send + Sync,
        P: Send + Sync,
    {
        let login = Login::new(login)?;

        // Hashing happens outside the transaction; only the guard checks and
        // the insert need the serializable snapshot.
        let credential = self.password_hasher.hash(&password)?;

        let user = self
            .mutation_repository
            .create_user(NewUser {
                login,
                credential,
                group_id,
            })
            .await?;

        Ok(user)
    }
}
