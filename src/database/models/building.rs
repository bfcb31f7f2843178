use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Building {
    pub id: Uuid,
    pub property_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub floor_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
