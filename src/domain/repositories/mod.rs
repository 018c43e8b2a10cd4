pub mod user_mutation_repository;
pub mod user_repository;
