use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: Uuid,
    pub floor_id: Uuid,
    pub building_id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub room_number: String,
    /// Bed capacity of the room (2-share, 3-share, ...)
    pub share_type: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
