use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};

pub async fn get_token(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let token = state
        .store
        .get_token_by_id(&id)
        .api_err("Failed to get token")?
        .or_not_found("Token not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(token)))
}

pub async fn delete_token(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if admin.0.id == id {
        return Err(ApiError::bad_request("Cannot revoke the token used for this request"));
    }

    let deleted = state
        .store
        .delete_token(&id)
        .api_err("Failed to delete token")?;

    if !deleted {
        return Err(ApiError::not_found("Token not found"));
    }

    tracing::info!(token_id = %id, "Revoked token");
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
