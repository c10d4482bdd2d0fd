//! Request extractors whose rejections use the [`AppError`] JSON envelope.
//!
//! Drop-in replacements for axum's `Json`, `Path`, and `Query`: a body that
//! does not deserialize, a non-numeric id, or a malformed query string
//! becomes a 400 `{"error", "code": "BAD_REQUEST"}` response.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
