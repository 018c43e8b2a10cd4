use async_trait::async_trait;
use chrono::{Duration, Utc};
use entity::users;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, IsolationLevel,
    TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    error::MutationError,
    models::user::{Login, User},
    repositories::user_mutation_repository::{NewUser, UserChanges, UserMutationRepository},
};
use crate::infrastructure::{
    admin_elevation::AdminElevation, reference, signup_throttler::SignupThrottler,
};

/// Runs every registry mutation as one serializable transaction: load the
/// snapshot, evaluate the guards, write, commit. Any guard failure aborts
/// the transaction (dropping it rolls back), and a serialization failure at
/// commit surfaces as a Conflict the caller may retry.
#[derive(Clone)]
pub struct PostgresUserMutationRepository {
    db: Arc<DatabaseConnection>,
    signup_cooldown: Duration,
}

impl PostgresUserMutationRepository {
    pub fn new(db: Arc<DatabaseConnection>, signup_cooldown: Duration) -> Self {
        Self {
            db,
            signup_cooldown,
        }
    }
}

#[async_trait]
impl UserMutationRepository for PostgresUserMutationRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, MutationError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?;

        if reference::find_group(&txn, new_user.group_id).await?.is_none() {
            return Err(MutationError::UnknownGroup);
        }

        // New accounts have no id yet, so the elevation guard runs unbound.
        let elevation = AdminElevation::new(&txn);
        if !elevation.can_enter_group(new_user.group_id, None).await? {
            return Err(MutationError::AdminOccupied);
        }

        let throttler = SignupThrottler::new(&txn, self.signup_cooldown);
        if !throttler.is_signup_allowed(new_user.login.as_str()).await? {
            return Err(MutationError::LoginThrottled);
        }

        let active_state = reference::active_state(&txn).await?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let model = users::ActiveModel {
            id: Set(id),
            login: Set(new_user.login.as_str().to_string()),
            password_hash: Set(new_user.credential.hash().to_string()),
            salt: Set(new_user.credential.salt().to_string()),
            created_at: Set(now.fixed_offset()),
            group_id: Set(new_user.group_id),
            state_id: Set(active_state.id),
        };
        users::Entity::insert(model)
            .exec(&txn)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?;

        txn.commit().await.map_err(commit_error)?;

        Ok(User::new(
            id,
            new_user.login,
            now,
            new_user.group_id,
            active_state.id,
        ))
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, MutationError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?;

        let user = users::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?
            .ok_or(MutationError::NotFound)?;

        let active_state = reference::active_state(&txn).await?;
        if user.state_id != active_state.id {
            // Already blocked: invisible to mutation, same as absent.
            return Err(MutationError::NotFound);
        }

        if reference::find_group(&txn, changes.group_id).await?.is_none() {
            return Err(MutationError::UnknownGroup);
        }

        // The account's own id is the candidate, so an existing admin
        // renaming itself still passes.
        let elevation = AdminElevation::new(&txn);
        if !elevation.can_enter_group(changes.group_id, Some(id)).await? {
            return Err(MutationError::AdminOccupied);
        }

        let mut active_model: users::ActiveModel = user.into();
        active_model.login = Set(changes.login.as_str().to_string());
        active_model.group_id = Set(changes.group_id);
        let updated = active_model
            .update(&txn)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?;

        match txn.commit().await {
            Ok(()) => model_to_user(updated),
            Err(e) if is_serialization_failure(&e) => {
                tracing::debug!(user_id = %id, "update lost a serialization race");
                let still_present = users::Entity::find_by_id(id)
                    .one(&*self.db)
                    .await
                    .map_err(|e| MutationError::Database(e.to_string()))?
                    .is_some();
                Err(if still_present {
                    MutationError::Conflict
                } else {
                    MutationError::NotFound
                })
            }
            Err(e) => Err(MutationError::Database(e.to_string())),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<User, MutationError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?;

        let user = users::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?
            .ok_or(MutationError::NotFound)?;

        let active_state = reference::active_state(&txn).await?;
        if user.state_id != active_state.id {
            return Err(MutationError::NotFound);
        }

        let blocked_state = reference::blocked_state(&txn).await?;
        let mut active_model: users::ActiveModel = user.into();
        active_model.state_id = Set(blocked_state.id);
        let updated = active_model
            .update(&txn)
            .await
            .map_err(|e| MutationError::Database(e.to_string()))?;

        txn.commit().await.map_err(commit_error)?;

        model_to_user(updated)
    }
}

fn commit_error(err: DbErr) -> MutationError {
    if is_serialization_failure(&err) {
        tracing::debug!(error = %err, "commit lost a serialization race");
        MutationError::Conflict
    } else {
        MutationError::Database(err.to_string())
    }
}

// Postgres reports serializable aborts as SQLSTATE 40001 and deadlocks as
// 40P01; both are transient and safe for the caller to retry.
fn is_serialization_failure(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("40001")
        || message.contains("could not serialize")
        || message.contains("40P01")
        || message.contains("deadlock detected")
}

fn model_to_user(model: users::Model) -> Result<User, MutationError> {
    let login = Login::new(model.login).map_err(|e| MutationError::Database(e.to_string()))?;
    Ok(User::new(
        model.id,
        login,
        model.created_at.naive_utc().and_utc(),
        model.group_id,
        model.state_id,
    ))
}
