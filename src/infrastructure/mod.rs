pub mod admin_elevation;
pub mod argon2_password_hasher;
pub mod reference;
pub mod signup_throttler;
pub mod user_mutation_repository;
pub mod user_repository;
