use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};
use tower::ServiceBuilder;

use super::admin::admin_router;
use super::user::user_router;
use crate::config::ServerConfig;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Entries per board returned by the recent activity feed.
    pub activity_preview: usize,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Self {
        Self {
            store,
            activity_preview: config.activity_preview,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1", user_router())
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_request)))
        .with_state(state)
}
