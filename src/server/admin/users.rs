use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{RequireAdmin, issue_token};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{
    CreateTokenResponse, CreateUserRequest, CreateUserTokenRequest, PaginationParams,
};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::service::validation::Violations;
use crate::types::{DEFAULT_IMAGE, User};

pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> impl IntoResponse {
    let email = req.email.trim().to_lowercase();

    Violations::new()
        .require_text("email", &email)
        .check(
            email.is_empty() || email.contains('@'),
            "email",
            "email must be a valid address",
        )
        .require_text("name", &req.name)
        .finish()?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        name: req.name.trim().to_string(),
        profile_pic: req
            .profile_pic
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        created_at: now,
        updated_at: now,
    };

    match state.store.create_user(&user) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("A user with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "Created user");
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> impl IntoResponse {
    let cursor = params.cursor.as_deref().unwrap_or("");

    let users = state
        .store
        .list_users(cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list users")?;

    let (users, next_cursor, has_more) =
        paginate(users, DEFAULT_PAGE_SIZE as usize, |u| u.id.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(users, next_cursor, has_more)))
}

pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn list_user_tokens(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let tokens = state
        .store
        .list_user_tokens(&user.id)
        .api_err("Failed to list user tokens")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tokens)))
}

pub async fn create_user_token(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CreateUserTokenRequest>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    if let Some(seconds) = req.expires_in_seconds {
        if seconds < 0 {
            return Err(ApiError::bad_request(
                "expiresInSeconds cannot be negative",
            ));
        }
    }

    let expires_at = req
        .expires_in_seconds
        .map(|s| Utc::now() + Duration::seconds(s));

    let (token, raw_token) = issue_token(state.store.as_ref(), false, Some(user.id), expires_at)
        .api_err("Failed to create token")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateTokenResponse {
            token: raw_token,
            metadata: token,
        })),
    ))
}
