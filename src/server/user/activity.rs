use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};
use crate::service::audit;

pub async fn board_audit(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let logs = audit::board_history(state.store.as_ref(), &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(logs)))
}

/// Dashboard preview: the few newest entries of each of the caller's boards.
pub async fn recent_activity(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let activity = audit::recent_activity(
        state.store.as_ref(),
        &auth.user.id,
        state.activity_preview,
    )?;

    Ok::<_, ApiError>(Json(ApiResponse::success(activity)))
}
