use entity::{user_groups, user_states};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, sea_query::OnConflict,
};

use crate::domain::{
    error::RepositoryError,
    models::user::{GroupCode, StateCode},
};

// Lookups of the seeded reference rows. All of them are generic over
// `ConnectionTrait` so that a guard or orchestrator running inside a
// transaction reads through that transaction's snapshot, never through a
// separate connection. A missing row means the store was never seeded and is
// reported as a database fault, not as a client-visible NotFound.

pub async fn admin_group<C: ConnectionTrait>(
    conn: &C,
) -> Result<user_groups::Model, RepositoryError> {
    user_groups::Entity::find()
        .filter(user_groups::Column::Code.eq(GroupCode::Admin.as_code()))
        .one(conn)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
        .ok_or_else(|| missing_reference("user_groups", "Admin"))
}

pub async fn active_state<C: ConnectionTrait>(
    conn: &C,
) -> Result<user_states::Model, RepositoryError> {
    user_states::Entity::find()
        .filter(user_states::Column::Code.eq(StateCode::Active.as_code()))
        .one(conn)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
        .ok_or_else(|| missing_reference("user_states", "Active"))
}

pub async fn blocked_state<C: ConnectionTrait>(
    conn: &C,
) -> Result<user_states::Model, RepositoryError> {
    user_states::Entity::find()
        .filter(user_states::Column::Code.eq(StateCode::Blocked.as_code()))
        .one(conn)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
        .ok_or_else(|| missing_reference("user_states", "Blocked"))
}

pub async fn find_group<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<user_groups::Model>, RepositoryError> {
    user_groups::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
}

fn missing_reference(table: &str, row: &str) -> RepositoryError {
    RepositoryError::DatabaseError(format!("{table} is missing the {row} row"))
}

/// Idempotent seeding of the group/state reference tables. Both tables are
/// read-only after this point.
pub async fn seed_reference_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let groups = [
        user_groups::ActiveModel {
            id: Set(1),
            code: Set(GroupCode::Admin.as_code()),
            description: Set("Admin group".to_string()),
        },
        user_groups::ActiveModel {
            id: Set(2),
            code: Set(GroupCode::User.as_code()),
            description: Set("User group".to_string()),
        },
    ];
    user_groups::Entity::insert_many(groups)
        .on_conflict(
            OnConflict::column(user_groups::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;

    let states = [
        user_states::ActiveModel {
            id: Set(1),
            code: Set(StateCode::Active.as_code()),
            description: Set("Active user".to_string()),
        },
        user_states::ActiveModel {
            id: Set(2),
            code: Set(StateCode::Blocked.as_code()),
            description: Set("Blocked user".to_string()),
        },
    ];
    user_states::Entity::insert_many(states)
        .on_conflict(
            OnConflict::column(user_states::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;

    Ok(())
}
