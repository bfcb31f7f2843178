use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bed {
    pub id: Uuid,
    pub room_id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub bed_number: i32,
    pub is_occupied: bool,
    pub created_at: DateTime<Utc>,
}
