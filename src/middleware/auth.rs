use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, TokenKind};
use crate::error::ApiError;
use crate::services::auth_service::AuthService;

/// Authenticated owner context, injected as a request extension for every
/// protected handler.
#[derive(Clone, Debug)]
pub struct AuthOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Bearer-token middleware for `/api/*`: validates the access JWT, confirms
/// the owner still exists and is active, then injects [`AuthOwner`].
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::verify_token(&token, TokenKind::Access)
        .map_err(|e| {
            tracing::debug!("access token rejected: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;

    let service = AuthService::new().await?;
    let owner = service.find_active_owner(claims.uid).await?;

    request.extensions_mut().insert(AuthOwner {
        id: owner.id,
        name: owner.name,
        email: owner.email,
    });

    Ok(next.run(request).await)
}

/// Extract the JWT from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn rejects_non_bearer_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn rejects_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer  "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
