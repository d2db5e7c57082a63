use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{
    AddCommentRequest, AssignMemberRequest, CreateCardRequest, MoveCardRequest, UpdateCardRequest,
};
use crate::server::extract::ApiJson;
use crate::server::response::{ApiError, ApiResponse};
use crate::service::card;

pub async fn create_card(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateCardRequest>,
) -> impl IntoResponse {
    let card = card::create(state.store.as_ref(), &auth.actor(), req.into())?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(card))))
}

pub async fn update_card(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateCardRequest>,
) -> impl IntoResponse {
    let card = card::update(state.store.as_ref(), &auth.actor(), &id, req.into())?;

    Ok::<_, ApiError>(Json(ApiResponse::success(card)))
}

pub async fn delete_card(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    card::delete(state.store.as_ref(), &auth.actor(), &id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn move_card(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MoveCardRequest>,
) -> impl IntoResponse {
    let card = card::move_card(
        state.store.as_ref(),
        &auth.actor(),
        &id,
        &req.target_list_id,
        req.position,
    )?;

    Ok::<_, ApiError>(Json(ApiResponse::success(card)))
}

pub async fn add_comment(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AddCommentRequest>,
) -> impl IntoResponse {
    let comment = card::add_comment(state.store.as_ref(), &auth.actor(), &id, &req.text)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

pub async fn assign_member(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AssignMemberRequest>,
) -> impl IntoResponse {
    let card = card::assign_member(state.store.as_ref(), &auth.actor(), &id, &req.member_id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(card)))
}
