use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Payment;
use crate::services::member_service::fetch_owned_member;
use crate::services::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentInput {
    pub member_id: Uuid,
    pub amount: Decimal,
    pub paid_on: Option<DateTime<Utc>>,
    pub method: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaymentInput {
    pub amount: Option<Decimal>,
    pub paid_on: Option<DateTime<Utc>>,
    pub method: Option<String>,
    pub note: Option<String>,
}

impl UpdatePaymentInput {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.paid_on.is_none() && self.method.is_none() && self.note.is_none()
    }
}

pub struct PaymentService {
    pool: PgPool,
}

impl PaymentService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub async fn create_payment(&self, owner_id: Uuid, input: CreatePaymentInput) -> Result<Payment, ServiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::invalid("Payment amount must be positive"));
        }

        // Ownership is scoped through the member
        let member = fetch_owned_member(&self.pool, owner_id, input.member_id).await?;

        let payment: Payment = sqlx::query_as(
            r#"
            INSERT INTO payments (member_id, property_id, owner_id, amount, paid_on, method, note)
            VALUES ($1, $2, $3, $4, COALESCE($5, now()), $6, $7)
            RETURNING *
            "#,
        )
        .bind(member.id)
        .bind(member.property_id)
        .bind(owner_id)
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(&input.method)
        .bind(&input.note)
        .fetch_one(&self.pool)
        .await?;

        info!(owner_id = %owner_id, payment_id = %payment.id, member_id = %member.id, "payment recorded");
        Ok(payment)
    }

    pub async fn list_payments(
        &self,
        owner_id: Uuid,
        member_id: Option<Uuid>,
        property_id: Option<Uuid>,
    ) -> Result<Vec<Payment>, ServiceError> {
        let payments = sqlx::query_as(
            r#"
            SELECT * FROM payments
            WHERE owner_id = $1
              AND ($2::uuid IS NULL OR member_id = $2)
              AND ($3::uuid IS NULL OR property_id = $3)
            ORDER BY paid_on DESC
            "#,
        )
        .bind(owner_id)
        .bind(member_id)
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    pub async fn get_payment(&self, owner_id: Uuid, payment_id: Uuid) -> Result<Payment, ServiceError> {
        self.fetch_owned_payment(owner_id, payment_id).await
    }

    pub async fn update_payment(
        &self,
        owner_id: Uuid,
        payment_id: Uuid,
        input: UpdatePaymentInput,
    ) -> Result<Payment, ServiceError> {
        let payment = self.fetch_owned_payment(owner_id, payment_id).await?;

        if input.is_empty() {
            return Ok(payment);
        }
        if let Some(amount) = input.amount {
            if amount <= Decimal::ZERO {
                return Err(ServiceError::invalid("Payment amount must be positive"));
            }
        }

        let updated: Payment = sqlx::query_as(
            r#"
            UPDATE payments
            SET amount = COALESCE($2, amount),
                paid_on = COALESCE($3, paid_on),
                method = COALESCE($4, method),
                note = COALESCE($5, note)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(&input.method)
        .bind(&input.note)
        .fetch_one(&self.pool)
        .await?;

        info!(owner_id = %owner_id, payment_id = %payment_id, "payment updated");
        Ok(updated)
    }

    pub async fn delete_payment(&self, owner_id: Uuid, payment_id: Uuid) -> Result<(), ServiceError> {
        let payment = self.fetch_owned_payment(owner_id, payment_id).await?;

        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment.id)
            .execute(&self.pool)
            .await?;

        info!(owner_id = %owner_id, payment_id = %payment_id, "payment deleted");
        Ok(())
    }

    async fn fetch_owned_payment(&self, owner_id: Uuid, payment_id: Uuid) -> Result<Payment, ServiceError> {
        let payment: Option<Payment> = sqlx::query_as("SELECT * FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;

        let payment = payment.ok_or_else(|| ServiceError::not_found("Payment not found"))?;
        if payment.owner_id != owner_id {
            warn!(owner_id = %owner_id, payment_id = %payment_id, "unauthorized payment access");
            return Err(ServiceError::forbidden("Not allowed"));
        }
        Ok(payment)
    }
}
