use entity::{user_groups, users};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::domain::{error::RepositoryError, models::user::GroupCode};
use crate::infrastructure::reference;

/// Decides whether an account may hold or obtain the Admin group.
///
/// Borrows the caller's connection so that, when invoked from a mutation
/// path, every read shares the enclosing transaction's snapshot. The check
/// and the subsequent write then form one atomic unit under serializable
/// isolation.
pub struct AdminElevation<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AdminElevation<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// True iff no account satisfies `group = Admin AND state = Active`, or
    /// the unique such account is the candidate itself. `None` stands for a
    /// new account that has no id yet.
    pub async fn can_become_admin(&self, candidate: Option<Uuid>) -> Result<bool, RepositoryError> {
        let admin_group = reference::admin_group(self.conn).await?;
        let active_state = reference::active_state(self.conn).await?;

        let seat_holder = users::Entity::find()
            .filter(users::Column::GroupId.eq(admin_group.id))
            .filter(users::Column::StateId.eq(active_state.id))
            .one(self.conn)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(match seat_holder {
            None => true,
            Some(admin) => candidate == Some(admin.id),
        })
    }

    /// The User group is always enterable; the Admin group delegates to
    /// `can_become_admin`.
    pub async fn can_enter_group(
        &self,
        group_id: i32,
        candidate: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        let group = user_groups::Entity::find_by_id(group_id)
            .one(self.conn)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        match GroupCode::from_code(group.code) {
            Some(GroupCode::User) => Ok(true),
            Some(GroupCode::Admin) => self.can_become_admin(candidate).await,
            None => Err(RepositoryError::DatabaseError(format!(
                "unknown group code {} in user_groups row {}",
                group.code, group.id
            ))),
        }
    }
}
