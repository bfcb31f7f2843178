use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Floor {
    pub id: Uuid,
    pub building_id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    /// Numeric position; 0 for the ground floor, -1 for basements
    pub floor_number: i32,
    /// Display label as entered, e.g. "G" or "2"
    pub floor_label: String,
    pub room_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
