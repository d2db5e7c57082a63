use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{CreateListRequest, UpdateListRequest};
use crate::server::extract::ApiJson;
use crate::server::response::{ApiError, ApiResponse};
use crate::service::list;

pub async fn create_list(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateListRequest>,
) -> impl IntoResponse {
    let list = list::create(state.store.as_ref(), &auth.actor(), &req.board_id, &req.title)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(list))))
}

pub async fn update_list(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateListRequest>,
) -> impl IntoResponse {
    let list = list::update(state.store.as_ref(), &auth.actor(), &id, req.into())?;

    Ok::<_, ApiError>(Json(ApiResponse::success(list)))
}

pub async fn delete_list(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    list::delete(state.store.as_ref(), &auth.actor(), &id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
