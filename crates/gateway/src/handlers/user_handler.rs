//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use common::AppResult;
use domain::{is_valid_email, is_valid_name, UserChanges, UserResponse, MIN_AGE};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// User creation request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(custom(function = "validate_name"))]
    #[schema(example = "Ann")]
    pub name: String,
    /// Unique email address
    #[validate(custom(function = "validate_email"))]
    #[schema(example = "ann@x.com")]
    pub email: String,
    #[validate(range(min = MIN_AGE, message = "Age cannot be negative"))]
    #[schema(example = 30)]
    pub age: i32,
}

/// Full replacement of a user's mutable fields
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_name"))]
    #[schema(example = "Annie")]
    pub name: String,
    #[validate(custom(function = "validate_email"))]
    #[schema(example = "annie@x.com")]
    pub email: String,
    #[validate(range(min = MIN_AGE, message = "Age cannot be negative"))]
    #[schema(example = 31)]
    pub age: i32,
}

// Same rules and messages as `NewUser::validate`, so both adapters agree
fn validate_name(name: &str) -> Result<(), ValidationError> {
    check(is_valid_name(name), "name", "Name cannot be empty")
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    check(is_valid_email(email), "email", "Invalid email format")
}

fn check(valid: bool, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    Err(err)
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        UserChanges::new(req.name, req.email, req.age)
    }
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .user_service
        .create_user(payload.name, payload.email, payload.age)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Replace a user's name, email and age
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.update_user(id, payload.into()).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
