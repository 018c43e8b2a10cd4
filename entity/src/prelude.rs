pub use super::user_groups::Entity as UserGroups;
pub use super::user_states::Entity as UserStates;
pub use super::users::Entity as Users;
