use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub bed_id: Option<Uuid>,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub document_id: Option<String>,
    pub check_in_date: Option<DateTime<Utc>>,
    pub deposit_amount: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
