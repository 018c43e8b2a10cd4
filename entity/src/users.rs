use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTimeWithTimeZone,
    pub group_id: i32,
    pub state_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_groups::Entity",
        from = "Column::GroupId",
        to = "super::user_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    UserGroups,
    #[sea_orm(
        belongs_to = "super::user_states::Entity",
        from = "Column::StateId",
        to = "super::user_states::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    UserStates,
}

impl Related<super::user_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGroups.def()
    }
}

impl Related<super::user_states::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserStates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
