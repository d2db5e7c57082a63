use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{AddMemberRequest, CreateBoardRequest, CreateBoardResponse};
use crate::server::extract::ApiJson;
use crate::server::response::{ApiError, ApiResponse};
use crate::service::board;

pub async fn my_boards(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let boards = board::list_owned(state.store.as_ref(), &auth.user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(boards)))
}

pub async fn shared_boards(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let boards = board::list_shared(state.store.as_ref(), &auth.user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(boards)))
}

pub async fn create_board(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateBoardRequest>,
) -> impl IntoResponse {
    let (board, lists) = board::create(
        state.store.as_ref(),
        &auth.actor(),
        &req.title,
        req.background.as_deref(),
    )?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateBoardResponse { board, lists })),
    ))
}

pub async fn get_board(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let view = board::get_full(state.store.as_ref(), &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

pub async fn delete_board(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    board::delete(state.store.as_ref(), &auth.actor(), &id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn add_member(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> impl IntoResponse {
    let board = board::add_member(state.store.as_ref(), &auth.actor(), &id, &req.email)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(board)))
}
