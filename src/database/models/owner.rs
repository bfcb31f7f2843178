use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Owner account row. Not serializable: the password hash and lockout
/// counters never leave the database layer. Use [`OwnerProfile`] on the wire.
#[derive(Debug, Clone, FromRow)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub last_failed_login_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Owner> for OwnerProfile {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.id,
            name: owner.name.clone(),
            email: owner.email.clone(),
            phone: owner.phone.clone(),
            is_active: owner.is_active,
            created_at: owner.created_at,
        }
    }
}
