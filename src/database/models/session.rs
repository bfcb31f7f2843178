use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One refresh session per (owner, device). Login upserts the row, refresh
/// rotates the jti, logout sets revoked_at.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub device_id: String,
    pub device_type: Option<String>,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: Duration, revoked: bool) -> RefreshSession {
        let now = Utc::now();
        RefreshSession {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            device_id: "device-1".to_string(),
            device_type: None,
            jti: "jti".to_string(),
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn live_session() {
        assert!(session(Duration::days(1), false).is_live(Utc::now()));
    }

    #[test]
    fn expired_or_revoked_sessions_are_dead() {
        assert!(!session(Duration::seconds(-1), false).is_live(Utc::now()));
        assert!(!session(Duration::days(1), true).is_live(Utc::now()));
    }
}
