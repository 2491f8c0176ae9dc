//! Extractors whose rejections render as [`ApiError`] JSON instead of axum's plain text.

use axum::extract::{FromRequest, FromRequestParts, Query};

use super::error::ApiError;

/// JSON request body; malformed or missing fields are a 400, an oversized body a 413.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string; undecodable parameters are a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
