use chrono::{Duration, Utc};
use entity::users;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::domain::error::RepositoryError;

/// Decides whether a new account with a given login may be created now.
///
/// Like the elevation guard, this borrows the caller's connection so the
/// check runs against the enclosing transaction's snapshot. Two simultaneous
/// signups with the same login then cannot both pass before either commits.
pub struct SignupThrottler<'a, C: ConnectionTrait> {
    conn: &'a C,
    cooldown: Duration,
}

impl<'a, C: ConnectionTrait> SignupThrottler<'a, C> {
    pub fn new(conn: &'a C, cooldown: Duration) -> Self {
        Self { conn, cooldown }
    }

    /// False iff any account with this login was created at or after
    /// `now - cooldown`. A record created exactly at the checkpoint still
    /// counts as recent.
    pub async fn is_signup_allowed(&self, login: &str) -> Result<bool, RepositoryError> {
        let checkpoint = Utc::now() - self.cooldown;

        let recent = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .filter(users::Column::CreatedAt.gte(checkpoint))
            .one(self.conn)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(recent.is_none())
    }
}
