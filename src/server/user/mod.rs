mod activity;
mod boards;
mod cards;
mod lists;
mod profile;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Profile and directory
        .route("/profile/me", get(profile::get_me).put(profile::update_me))
        .route("/users/search", get(profile::search_users))
        // Boards
        .route("/boards", post(boards::create_board))
        .route("/boards/my", get(boards::my_boards))
        .route("/boards/shared", get(boards::shared_boards))
        .route(
            "/boards/{id}",
            get(boards::get_board).delete(boards::delete_board),
        )
        .route("/boards/{id}/members", post(boards::add_member))
        .route("/boards/{id}/audit", get(activity::board_audit))
        .route("/audit/recent", get(activity::recent_activity))
        // Lists
        .route("/lists", post(lists::create_list))
        .route(
            "/lists/{id}",
            put(lists::update_list).delete(lists::delete_list),
        )
        // Cards
        .route("/cards", post(cards::create_card))
        .route(
            "/cards/{id}",
            put(cards::update_card).delete(cards::delete_card),
        )
        .route("/cards/{id}/move", put(cards::move_card))
        .route("/cards/{id}/comment", post(cards::add_comment))
        .route("/cards/{id}/assign", put(cards::assign_member))
}
