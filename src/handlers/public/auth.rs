use axum::{http::HeaderMap, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::api;
use crate::error::ApiError;
use crate::handlers::device_info_from_headers;
use crate::services::auth_service::{AuthService, LoginInput, RegisterInput};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/register - Create an owner account and return a token pair
pub async fn register(
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = AuthService::new().await?;
    let (owner, tokens) = service
        .register(
            RegisterInput {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                password: payload.password,
            },
            device_info_from_headers(&headers),
        )
        .await?;

    Ok(api::created(json!({ "user": owner, "tokens": tokens })))
}

/// POST /auth/login - Authenticate and return a token pair
pub async fn login(
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = AuthService::new().await?;
    let (owner, tokens) = service
        .login(
            LoginInput {
                email: payload.email,
                password: payload.password,
            },
            device_info_from_headers(&headers),
        )
        .await?;

    Ok(api::ok(json!({ "user": owner, "tokens": tokens })))
}

/// POST /auth/refresh - Rotate a refresh token into a new token pair
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> Result<impl IntoResponse, ApiError> {
    if payload.refresh_token.trim().is_empty() {
        return Err(ApiError::bad_request("Missing refresh token"));
    }

    let service = AuthService::new().await?;
    let (owner, tokens) = service.refresh(&payload.refresh_token).await?;

    Ok(api::ok(json!({ "user": owner, "tokens": tokens })))
}
