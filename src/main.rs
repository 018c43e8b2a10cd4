mod domain;
mod infrastructure;
mod presentation;
mod usecase;

use axum::{Router, routing::get};
use chrono::Duration;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::{
    infrastructure::{
        argon2_password_hasher::Argon2PasswordHasher, reference,
        user_mutation_repository::PostgresUserMutationRepository,
        user_repository::PostgresUserRepository,
    },
    presentation::handlers::user_handler::create_user_router,
    usecase::{
        delete_user_usecase::DeleteUserUsecase, register_user_usecase::RegisterUserUsecase,
        update_user_usecase::UpdateUserUsecase, user_query_usecase::UserQueryUsecase,
    },
};

// One-time startup concern; per-request retries stay with the caller.
const DB_CONNECT_ATTEMPTS: u32 = 10;
const DB_CONNECT_RETRY_DELAY: std::time::Duration = std::time::Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let db = Arc::new(connect_with_retry(&dotenvy::var("DATABASE_URL")?).await?);
    reference::seed_reference_data(&db).await?;

    let mutation_repository =
        PostgresUserMutationRepository::new(db.clone(), signup_cooldown_from_env());
    let user_repository = PostgresUserRepository::new(db.clone());
    let password_hasher = Argon2PasswordHasher::new();

    let register_service =
        RegisterUserUsecase::new(mutation_repository.clone(), password_hasher.clone());
    let update_service = UpdateUserUsecase::new(mutation_repository.clone());
    let delete_service = DeleteUserUsecase::new(mutation_repository.clone());
    let query_service = UserQueryUsecase::new(user_repository.clone());

    let app = Router::new()
        .route("/", get(|| async { "user registry" }))
        .nest(
            "/api",
            create_user_router(register_service, update_service, delete_service, query_service),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn connect_with_retry(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut attempt = 1u32;
    loop {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(10)
            .min_connections(1)
            .sqlx_logging(true);

        match Database::connect(opt).await {
            Ok(db) => return Ok(db),
            Err(err) if attempt < DB_CONNECT_ATTEMPTS => {
                tracing::warn!(attempt, error = %err, "database connection failed, retrying");
                tokio::time::sleep(DB_CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(error = %err, "database unreachable, giving up");
                return Err(err);
            }
        }
    }
}

fn signup_cooldown_from_env() -> Duration {
    let secs = dotenvy::var("SIGNUP_COOLDOWN_SECS")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(5);
    Duration::seconds(secs)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use rstest::*;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        domain::{
            error::{DomainError, MutationError, RepositoryError},
            models::{
                credential::HashedPassword,
                user::{Login, User},
            },
            repositories::{
                user_mutation_repository::{NewUser, UserChanges, UserMutationRepository},
                user_repository::UserRepository,
            },
            services::password_service::PasswordHasher,
        },
        presentation::handlers::user_handler::{
            CreateUserRequest, UpdateUserRequest, UserResponse, create_user_router,
        },
        usecase::{
            delete_user_usecase::DeleteUserUsecase, register_user_usecase::RegisterUserUsecase,
            update_user_usecase::UpdateUserUsecase, user_query_usecase::UserQueryUsecase,
        },
    };

    const TEST_ID: &str = "00000000-0000-0000-0000-000000000001";
    const CONFLICT_ID: &str = "00000000-0000-0000-0000-000000000002";

    const ADMIN_GROUP_ID: i32 = 1;
    const USER_GROUP_ID: i32 = 2;
    const ACTIVE_STATE_ID: i32 = 1;
    const BLOCKED_STATE_ID: i32 = 2;

    fn test_user(login: &str, group_id: i32, state_id: i32) -> User {
        User::new(
            Uuid::parse_str(TEST_ID).unwrap(),
            Login::new(login.to_string()).unwrap(),
            Utc::now(),
            group_id,
            state_id,
        )
    }

    // mock repository interface
    #[derive(Clone)]
    struct MockUserMutationRepository;

    #[async_trait]
    impl UserMutationRepository for MockUserMutationRepository {
        async fn create_user(&self, new_user: NewUser) -> Result<User, MutationError> {
            if new_user.group_id == 99 {
                return Err(MutationError::UnknownGroup);
            }
            match new_user.login.as_str() {
                "second_admin" => Err(MutationError::AdminOccupied),
                "recent_login" => Err(MutationError::LoginThrottled),
                login => Ok(test_user(login, new_user.group_id, ACTIVE_STATE_ID)),
            }
        }

        async fn update_user(
            &self,
            id: Uuid,
            changes: UserChanges,
        ) -> Result<User, MutationError> {
            if changes.group_id == 99 {
                return Err(MutationError::UnknownGroup);
            }
            if id.to_string() == CONFLICT_ID {
                return Err(MutationError::Conflict);
            }
            if id.to_string() != TEST_ID {
                return Err(MutationError::NotFound);
            }
            Ok(test_user(
                changes.login.as_str(),
                changes.group_id,
                ACTIVE_STATE_ID,
            ))
        }

        async fn delete_user(&self, id: Uuid) -> Result<User, MutationError> {
            if id.to_string() != TEST_ID {
                return Err(MutationError::NotFound);
            }
            Ok(test_user("testuser", USER_GROUP_ID, BLOCKED_STATE_ID))
        }
    }

    #[derive(Clone)]
    struct MockUserRepository;

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_active_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
            if id.to_string() == TEST_ID {
                Ok(Some(test_user("testuser", USER_GROUP_ID, ACTIVE_STATE_ID)))
            } else {
                Ok(None)
            }
        }

        async fn list_active(&self) -> Result<Vec<User>, RepositoryError> {
            Ok(vec![test_user("testuser", USER_GROUP_ID, ACTIVE_STATE_ID)])
        }
    }

    #[derive(Clone)]
    struct MockPasswordHasher;

    impl PasswordHasher for MockPasswordHasher {
        fn hash(&self, _plain_password: &str) -> Result<HashedPassword, DomainError> {
            Ok(HashedPassword::new(
                "mock_hash".to_string(),
                "mock_salt".to_string(),
            ))
        }
    }

    #[fixture]
    async fn test_app() -> Router {
        // set up mock repositories
        let mock_mutation_repo = MockUserMutationRepository;
        let mock_user_repo = MockUserRepository;
        let mock_password_hasher = MockPasswordHasher;

        let register_service =
            RegisterUserUsecase::new(mock_mutation_repo.clone(), mock_password_hasher.clone());
        let update_service = UpdateUserUsecase::new(mock_mutation_repo.clone());
        let delete_service = DeleteUserUsecase::new(mock_mutation_repo.clone());
        let query_service = UserQueryUsecase::new(mock_user_repo.clone());

        // setup router: sync settings of main.app
        Router::new().nest(
            "/api",
            create_user_router(register_service, update_service, delete_service, query_service),
        )
    }

    /// # Description
    ///
    /// General request helper; every test case goes through here
    async fn send(app: Router, method: &str, uri: &str, body: Option<String>) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();

        app.oneshot(request).await.unwrap()
    }

    async fn response_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    // Create

    #[rstest]
    #[tokio::test]
    async fn test_create_user_positive(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&CreateUserRequest {
            login: "new_user".to_string(),
            password: "new_password".to_string(),
            group_id: USER_GROUP_ID,
        })
        .unwrap();

        let response = send(app, "POST", "/api/users", Some(body)).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let user: UserResponse = response_body(response).await;
        assert_eq!(user.login, "new_user");
        assert_eq!(user.group_id, USER_GROUP_ID);
        assert_eq!(user.state_id, ACTIVE_STATE_ID);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_second_admin_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&CreateUserRequest {
            login: "second_admin".to_string(),
            password: "new_password".to_string(),
            group_id: ADMIN_GROUP_ID,
        })
        .unwrap();

        let response = send(app, "POST", "/api/users", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_throttled_login_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&CreateUserRequest {
            login: "recent_login".to_string(),
            password: "new_password".to_string(),
            group_id: USER_GROUP_ID,
        })
        .unwrap();

        let response = send(app, "POST", "/api/users", Some(body)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_unknown_group_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&CreateUserRequest {
            login: "new_user".to_string(),
            password: "new_password".to_string(),
            group_id: 99,
        })
        .unwrap();

        let response = send(app, "POST", "/api/users", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_empty_login_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&CreateUserRequest {
            login: "  ".to_string(),
            password: "new_password".to_string(),
            group_id: USER_GROUP_ID,
        })
        .unwrap();

        let response = send(app, "POST", "/api/users", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Update

    #[rstest]
    #[tokio::test]
    async fn test_update_user_positive(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&UpdateUserRequest {
            id: Uuid::parse_str(TEST_ID).unwrap(),
            login: "renamed".to_string(),
            group_id: ADMIN_GROUP_ID,
        })
        .unwrap();

        let uri = format!("/api/users/{TEST_ID}");
        let response = send(app, "PUT", &uri, Some(body)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let user: UserResponse = response_body(response).await;
        assert_eq!(user.login, "renamed");
        assert_eq!(user.group_id, ADMIN_GROUP_ID);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_mismatched_id_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&UpdateUserRequest {
            id: Uuid::parse_str(CONFLICT_ID).unwrap(),
            login: "renamed".to_string(),
            group_id: USER_GROUP_ID,
        })
        .unwrap();

        let uri = format!("/api/users/{TEST_ID}");
        let response = send(app, "PUT", &uri, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_user_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let missing_id = "00000000-0000-0000-0000-00000000ffff";
        let body = serde_json::to_string(&UpdateUserRequest {
            id: Uuid::parse_str(missing_id).unwrap(),
            login: "renamed".to_string(),
            group_id: USER_GROUP_ID,
        })
        .unwrap();

        let uri = format!("/api/users/{missing_id}");
        let response = send(app, "PUT", &uri, Some(body)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_serialization_conflict_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let body = serde_json::to_string(&UpdateUserRequest {
            id: Uuid::parse_str(CONFLICT_ID).unwrap(),
            login: "renamed".to_string(),
            group_id: USER_GROUP_ID,
        })
        .unwrap();

        let uri = format!("/api/users/{CONFLICT_ID}");
        let response = send(app, "PUT", &uri, Some(body)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    // Delete

    #[rstest]
    #[tokio::test]
    async fn test_delete_user_positive(#[future] test_app: Router) {
        let app = test_app.await;

        let uri = format!("/api/users/{TEST_ID}");
        let response = send(app, "DELETE", &uri, None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let user: UserResponse = response_body(response).await;
        // soft delete: the record comes back, in the Blocked state
        assert_eq!(user.id, TEST_ID);
        assert_eq!(user.state_id, BLOCKED_STATE_ID);
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_missing_user_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let response = send(
            app,
            "DELETE",
            "/api/users/00000000-0000-0000-0000-00000000ffff",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // Query

    #[rstest]
    #[tokio::test]
    async fn test_get_user_positive(#[future] test_app: Router) {
        let app = test_app.await;

        let uri = format!("/api/users/{TEST_ID}");
        let response = send(app, "GET", &uri, None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let user: UserResponse = response_body(response).await;
        assert_eq!(user.id, TEST_ID);
        assert_eq!(user.login, "testuser");
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_missing_user_negative(#[future] test_app: Router) {
        let app = test_app.await;

        let response = send(
            app,
            "GET",
            "/api/users/00000000-0000-0000-0000-00000000ffff",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_users_positive(#[future] test_app: Router) {
        let app = test_app.await;

        let response = send(app, "GET", "/api/users", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let users: Vec<UserResponse> = response_body(response).await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].login, "testuser");
    }
}
