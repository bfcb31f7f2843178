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
use crate::services::payment_service::{CreatePaymentInput, PaymentService, UpdatePaymentInput};

#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub member_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
}

/// POST /api/payments
pub async fn create(
    Extension(owner): Extension<AuthOwner>,
    Json(payload): Json<CreatePaymentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PaymentService::new().await?;
    let payment = service.create_payment(owner.id, payload).await?;
    Ok(api::created(payment))
}

/// GET /api/payments?member_id=&property_id=
pub async fn list(
    Extension(owner): Extension<AuthOwner>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PaymentService::new().await?;
    let payments = service
        .list_payments(owner.id, query.member_id, query.property_id)
        .await?;
    Ok(api::ok(payments))
}

/// GET /api/payments/:id
pub async fn get(
    Extension(owner): Extension<AuthOwner>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PaymentService::new().await?;
    let payment = service.get_payment(owner.id, payment_id).await?;
    Ok(api::ok(payment))
}

/// PATCH /api/payments/:id
pub async fn update(
    Extension(owner): Extension<AuthOwner>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PaymentService::new().await?;
    let payment = service.update_payment(owner.id, payment_id, payload).await?;
    Ok(api::ok(payment))
}

/// DELETE /api/payments/:id
pub async fn delete(
    Extension(owner): Extension<AuthOwner>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = PaymentService::new().await?;
    service.delete_payment(owner.id, payment_id).await?;
    Ok(api::message("Payment deleted successfully"))
}
