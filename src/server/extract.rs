//! Body and query extractors whose rejections use the API error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use super::response::ApiError;

/// `axum::Json`, but a malformed body is a 400 in the usual envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with an enveloped 400 on bad query strings.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
