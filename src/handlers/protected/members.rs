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
use crate::services::member_service::{CreateMemberInput, MemberService, UpdateMemberInput};

#[derive(Debug, Deserialize)]
pub struct ListMembersQuery {
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AssignBedRequest {
    pub bed_id: Uuid,
}

/// POST /api/members - Create a member, optionally assigning a bed
pub async fn create(
    Extension(owner): Extension<AuthOwner>,
    Json(payload): Json<CreateMemberInput>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MemberService::new().await?;
    let member = service.create_member(owner.id, payload).await?;
    Ok(api::created(member))
}

/// GET /api/members?property_id= - One property's members, or all of the
/// caller's when the filter is absent
pub async fn list(
    Extension(owner): Extension<AuthOwner>,
    Query(query): Query<ListMembersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MemberService::new().await?;
    let members = service.list_members(owner.id, query.property_id).await?;
    Ok(api::ok(members))
}

/// GET /api/members/:id
pub async fn get(
    Extension(owner): Extension<AuthOwner>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MemberService::new().await?;
    let member = service.get_member(owner.id, member_id).await?;
    Ok(api::ok(member))
}

/// PATCH /api/members/:id - Profile fields only; bed moves go through
/// assign-bed/unassign-bed
pub async fn update(
    Extension(owner): Extension<AuthOwner>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberInput>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MemberService::new().await?;
    let member = service.update_member(owner.id, member_id, payload).await?;
    Ok(api::ok(member))
}

/// DELETE /api/members/:id - Frees the member's bed
pub async fn delete(
    Extension(owner): Extension<AuthOwner>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MemberService::new().await?;
    service.delete_member(owner.id, member_id).await?;
    Ok(api::message("Member deleted successfully"))
}

/// POST /api/members/:id/assign-bed
pub async fn assign_bed(
    Extension(owner): Extension<AuthOwner>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<AssignBedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MemberService::new().await?;
    let member = service.assign_bed(owner.id, member_id, payload.bed_id).await?;
    Ok(api::ok(member))
}

/// POST /api/members/:id/unassign-bed
pub async fn unassign_bed(
    Extension(owner): Extension<AuthOwner>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MemberService::new().await?;
    let member = service.unassign_bed(owner.id, member_id).await?;
    Ok(api::ok(member))
}
