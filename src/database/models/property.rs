use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// HOSTEL | APARTMENT
    pub property_type: String,
    pub city: Option<String>,
    pub area: Option<String>,
    pub address_line: Option<String>,
    pub phone: Option<String>,
    /// List of {share_type, price} entries
    pub bed_pricing: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
