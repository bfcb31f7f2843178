use axum::{extract::Query, response::IntoResponse, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::api;
use crate::error::ApiError;
use crate::middleware::AuthOwner;
use crate::services::dashboard_service::DashboardService;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub property_id: Uuid,
}

/// GET /api/dashboard/stats?property_id= - One property's aggregates
pub async fn stats(
    Extension(owner): Extension<AuthOwner>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = DashboardService::new().await?;
    let stats = service.property_stats(owner.id, query.property_id).await?;
    Ok(api::ok(stats))
}

/// GET /api/dashboard/summary - Aggregates across all the caller's properties
pub async fn summary(Extension(owner): Extension<AuthOwner>) -> Result<impl IntoResponse, ApiError> {
    let service = DashboardService::new().await?;
    let summary = service.owner_summary(owner.id).await?;
    Ok(api::ok(summary))
}
