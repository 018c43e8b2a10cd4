use async_trait::async_trait;
use entity::users;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    error::RepositoryError,
    models::user::{Login, User},
    repositories::user_repository::UserRepository,
};
use crate::infrastructure::reference;

#[derive(Clone)]
pub struct PostgresUserRepository {
    db: Arc<DatabaseConnection>,
}

impl PostgresUserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let active_state = reference::active_state(&*self.db).await?;

        let user = users::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        match user {
            Some(model) if model.state_id == active_state.id => Ok(Some(model_to_user(model)?)),
            _ => Ok(None),
        }
    }

    async fn list_active(&self) -> Result<Vec<User>, RepositoryError> {
        let active_state = reference::active_state(&*self.db).await?;

        let models = users::Entity::find()
            .filter(users::Column::StateId.eq(active_state.id))
            .all(&*self.db)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        models.into_iter().map(model_to_user).collect()
    }
}

fn model_to_user(model: users::Model) -> Result<User, RepositoryError> {
    let login = Login::new(model.login).map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
    Ok(User::new(
        model.id,
        login,
        model.created_at.naive_utc().and_utc(),
        model.group_id,
        model.state_id,
    ))
}
