//! Reads over the property subtree (buildings, floors, rooms, beds) plus
//! room deletion.

use axum::{extract::Path, response::IntoResponse, Extension};
use uuid::Uuid;

use crate::api;
use crate::error::ApiError;
use crate::middleware::AuthOwner;
use crate::services::property_service::PropertyService;

/// GET /api/properties/:id/buildings
pub async fn list_buildings(
    Extension(owner): Extension<AuthOwner>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let buildings = service.list_buildings(owner.id, property_id).await?;
    Ok(api::ok(buildings))
}

/// GET /api/buildings/:id/floors
pub async fn list_floors(
    Extension(owner): Extension<AuthOwner>,
    Path(building_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let floors = service.list_floors(owner.id, building_id).await?;
    Ok(api::ok(floors))
}

/// GET /api/floors/:id/rooms
pub async fn list_rooms(
    Extension(owner): Extension<AuthOwner>,
    Path(floor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let rooms = service.list_rooms(owner.id, floor_id).await?;
    Ok(api::ok(rooms))
}

/// GET /api/rooms/:id/beds
pub async fn list_beds(
    Extension(owner): Extension<AuthOwner>,
    Path(room_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let beds = service.list_beds(owner.id, room_id).await?;
    Ok(api::ok(beds))
}

/// GET /api/beds/:id
pub async fn get_bed(
    Extension(owner): Extension<AuthOwner>,
    Path(bed_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    let bed = service.get_bed(owner.id, bed_id).await?;
    Ok(api::ok(bed))
}

/// DELETE /api/rooms/:id - Refused while any bed in the room is occupied
pub async fn delete_room(
    Extension(owner): Extension<AuthOwner>,
    Path(room_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PropertyService::new().await?;
    service.delete_room(owner.id, room_id).await?;
    Ok(api::message("Room deleted successfully"))
}
