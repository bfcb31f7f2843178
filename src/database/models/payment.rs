use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub amount: Decimal,
    pub paid_on: DateTime<Utc>,
    pub method: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
