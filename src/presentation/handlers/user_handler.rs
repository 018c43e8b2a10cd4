use std::sync::Arc;

use crate::{
    domain::{
        error::{DomainError, MutationError, RepositoryError},
        models::user::User,
        repositories::{
            user_mutation_repository::UserMutationRepository, user_repository::UserRepository,
        },
        services::password_service::PasswordHasher,
    },
    usecase::{
        delete_user_usecase::DeleteUserUsecase, register_user_usecase::RegisterUserUsecase,
        update_user_usecase::UpdateUserUsecase, user_query_usecase::UserQueryUsecase,
    },
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Request

/// json for user creation
#[derive(Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub login: String,
    pub password: String,
    pub group_id: i32,
}

/// json for user update; `id` must match the path id
#[derive(Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Uuid,
    pub login: String,
    pub group_id: i32,
}

// Response

#[derive(Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub login: String,
    pub created_at: DateTime<Utc>,
    pub group_id: i32,
    pub state_id: i32,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().as_uuid().to_string(),
            login: user.login().to_string(),
            created_at: user.created_at(),
            group_id: user.group_id(),
            state_id: user.state_id(),
        }
    }
}

/* Router Function and Handler Function */

// User Router

/// function returning the Router object
/// Supposed to be nested under the main router
pub fn create_user_router<M, U, P>(
    register_service: RegisterUserUsecase<M, P>,
    update_service: UpdateUserUsecase<M>,
    delete_service: DeleteUserUsecase<M>,
    query_service: UserQueryUsecase<U>,
) -> Router
where
    M: UserMutationRepository + Send + Sync + 'static + Clone,
    U: UserRepository + Send + Sync + 'static + Clone,
    P: PasswordHasher + Send + Sync + 'static,
{
    let state = AppState {
        register_service: Arc::new(register_service),
        update_service: Arc::new(update_service),
        delete_service: Arc::new(delete_service),
        query_service: Arc::new(query_service),
    };

    Router::new()
        .route(
            "/users",
            get(list_users::<M, U, P>).post(create_user::<M, U, P>),
        )
        .route(
            "/users/{id}",
            get(get_user::<M, U, P>)
                .put(update_user::<M, U, P>)
                .delete(delete_user::<M, U, P>),
        )
        .with_state(state)
}

#[derive(Clone)]
pub struct AppState<M, U, P>
where
    M: UserMutationRepository,
    U: UserRepository,
    P: PasswordHasher,
{
    pub register_service: Arc<RegisterUserUsecase<M, P>>,
    pub update_service: Arc<UpdateUserUsecase<M>>,
    pub delete_service: Arc<DeleteUserUsecase<M>>,
    pub query_service: Arc<UserQueryUsecase<U>>,
}

// handler functions

/// handler function for user creation
async fn create_user<M, U, P>(
    State(state): State<AppState<M, U, P>>,
    Json(payload): Json<CreateUserRequest>,
) -> Response
where
    M: UserMutationRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    match state
        .register_service
        .create_user(payload.login, payload.password, payload.group_id)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(user))).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function for user update (promote / demote / rename)
async fn update_user<M, U, P>(
    State(state): State<AppState<M, U, P>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Response
where
    M: UserMutationRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    if id != payload.id {
        return (StatusCode::BAD_REQUEST, Json("Mismatched user id")).into_response();
    }

    match state
        .update_service
        .update_user(id, payload.login, payload.group_id)
        .await
    {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function for user soft-deletion
async fn delete_user<M, U, P>(
    State(state): State<AppState<M, U, P>>,
    Path(id): Path<Uuid>,
) -> Response
where
    M: UserMutationRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    match state.delete_service.delete_user(id).await {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function returning one active user
async fn get_user<M, U, P>(State(state): State<AppState<M, U, P>>, Path(id): Path<Uuid>) -> Response
where
    M: UserMutationRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    match state.query_service.get_user(id).await {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function listing active users
async fn list_users<M, U, P>(State(state): State<AppState<M, U, P>>) -> Response
where
    M: UserMutationRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    match state.query_service.list_users().await {
        Ok(users) => {
            let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Rejected guard outcomes are client errors, throttle and serialization
/// races are conflicts the caller may retry, storage faults stay internal.
fn error_response(err: DomainError) -> Response {
    let status = match &err {
        DomainError::EmptyLogin | DomainError::WeakPassword => StatusCode::BAD_REQUEST,
        DomainError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Mutation(MutationError::UnknownGroup)
        | DomainError::Mutation(MutationError::AdminOccupied) => StatusCode::BAD_REQUEST,
        DomainError::Mutation(MutationError::LoginThrottled)
        | DomainError::Mutation(MutationError::Conflict) => StatusCode::CONFLICT,
        DomainError::Mutation(MutationError::NotFound) => StatusCode::NOT_FOUND,
        DomainError::Mutation(MutationError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DomainError::Repository(RepositoryError::DatabaseError(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "request failed");
    }

    (status, Json(err.to_string())).into_response()
}
