pub mod delete_user_usecase;
pub mod register_user_usecase;
pub mod update_user_usecase;
pub mod user_query_usecase;
