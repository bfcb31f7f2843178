use axum::{http::HeaderMap, response::IntoResponse, Extension};

use crate::api;
use crate::database::models::OwnerProfile;
use crate::error::ApiError;
use crate::middleware::AuthOwner;
use crate::services::auth_service::AuthService;

/// GET /api/auth/me - Current owner profile
pub async fn me(Extension(owner): Extension<AuthOwner>) -> Result<impl IntoResponse, ApiError> {
    let service = AuthService::new().await?;
    let owner = service.find_active_owner(owner.id).await?;
    Ok(api::ok(OwnerProfile::from(&owner)))
}

/// POST /api/auth/logout - Revoke this device's refresh session
pub async fn logout(
    Extension(owner): Extension<AuthOwner>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let device_id = headers
        .get("x-device-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("X-Device-Id header is required"))?;

    let service = AuthService::new().await?;
    service.logout(owner.id, device_id).await?;

    Ok(api::message("Logged out successfully"))
}
