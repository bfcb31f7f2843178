use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api;
use crate::error::ApiError;
use crate::middleware::AuthOwner;
use crate::services::property_service::{CreatePropertyInput, PropertyService, UpdatePropertyInput};

#[derive(Debug, Deserialize)]
pub struct ListPropertiesQuery {
    pub property_type: Option<String>,
}

/// POST /api/properties - Create a property with its full subtree
pub async fn create(
    Extension(owner): Extension<AuthOwner>,
    Json(payload): Json<CreatePropertyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let tree = service.create_property(owner.id, payload).await?;
    Ok(api::created(tree))
}

/// GET /api/properties - Caller's properties with aggregate counts
pub async fn list(
    Extension(owner): Extension<AuthOwner>,
    Query(query): Query<ListPropertiesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let properties = service
        .list_properties(owner.id, query.property_type.as_deref())
        .await?;
    Ok(api::ok(properties))
}

/// GET /api/properties/:id
pub async fn get(
    Extension(owner): Extension<AuthOwner>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let property = service.get_property(owner.id, property_id).await?;
    Ok(api::ok(property))
}

/// GET /api/properties/:id/details - Nested tree + members + stats
pub async fn details(
    Extension(owner): Extension<AuthOwner>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let details = service.get_property_details(owner.id, property_id).await?;
    Ok(api::ok(details))
}

/// PATCH /api/properties/:id - Partial update
pub async fn update(
    Extension(owner): Extension<AuthOwner>,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let property = service.update_property(owner.id, property_id, payload).await?;
    Ok(api::ok(property))
}

/// DELETE /api/properties/:id - Cascade-delete the whole subtree
pub async fn delete(
    Extension(owner): Extension<AuthOwner>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    service.delete_property(owner.id, property_id).await?;
    Ok(api::message("Property deleted successfully"))
}
