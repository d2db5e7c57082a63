use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::auth::RequireUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{SearchParams, UpdateProfileRequest};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::service::validation::Violations;
use crate::types::UserSummary;

const SEARCH_LIMIT: i32 = 20;

pub async fn get_me(auth: RequireUser) -> impl IntoResponse {
    Json(ApiResponse::success(auth.user))
}

pub async fn update_me(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> impl IntoResponse {
    let email = req.email.map(|e| e.trim().to_lowercase());

    Violations::new()
        .optional_text("name", req.name.as_deref())
        .optional_text("email", email.as_deref())
        .check(
            email.as_deref().is_none_or(|e| e.is_empty() || e.contains('@')),
            "email",
            "email must be a valid address",
        )
        .finish()?;

    let mut user = auth.user;
    if let Some(name) = req.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = email {
        user.email = email;
    }
    if let Some(profile_pic) = req.profile_pic {
        user.profile_pic = profile_pic;
    }
    user.updated_at = Utc::now();

    match state.store.update_user(&user) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("A user with this email already exists"));
        }
        Err(e) => return Err(e.into()),
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn search_users(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::bad_request("Query is required"));
    }

    let users = state
        .store
        .search_users(query.trim(), SEARCH_LIMIT)
        .api_err("Failed to search users")?;

    let results: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(results)))
}
