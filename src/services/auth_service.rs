use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{self, password, Claims, TokenKind};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::{Owner, OwnerProfile, RefreshSession};
use crate::services::ServiceError;

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Device named by the X-Device-Id header; a fresh id is generated when the
/// client did not send one.
pub struct DeviceInfo {
    pub device_id: Option<String>,
    pub device_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub device_id: String,
}

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub async fn register(
        &self,
        input: RegisterInput,
        device: DeviceInfo,
    ) -> Result<(OwnerProfile, AuthTokens), ServiceError> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();

        if name.is_empty() {
            return Err(ServiceError::invalid("Name is required"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::invalid("A valid email is required"));
        }
        password::validate_password(&input.password).map_err(|e| ServiceError::invalid(e.to_string()))?;

        let email_taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM owners WHERE email = $1")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;
        if email_taken.is_some() {
            return Err(ServiceError::conflict("Email already exists"));
        }

        let name_taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM owners WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        if name_taken.is_some() {
            return Err(ServiceError::conflict("Name already exists"));
        }

        let password_hash = password::hash_password(&input.password)?;

        let owner: Owner = sqlx::query_as(
            r#"
            INSERT INTO owners (name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(&email)
        .bind(&input.phone)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        info!(owner_id = %owner.id, "owner registered");

        let tokens = self.issue_tokens(&owner, device).await?;
        Ok((OwnerProfile::from(&owner), tokens))
    }

    pub async fn login(
        &self,
        input: LoginInput,
        device: DeviceInfo,
    ) -> Result<(OwnerProfile, AuthTokens), ServiceError> {
        let identifier = input.email.trim();

        let owner: Option<Owner> =
            sqlx::query_as("SELECT * FROM owners WHERE email = $1 OR phone = $1")
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;

        let Some(owner) = owner else {
            warn!(identifier, "login failed: unknown account");
            return Err(ServiceError::unauthorized("Invalid credentials"));
        };

        if is_account_locked(&owner, Utc::now()) {
            warn!(owner_id = %owner.id, "login refused: account locked");
            return Err(ServiceError::AccountLocked);
        }

        if !owner.is_active {
            return Err(ServiceError::unauthorized("Account is inactive"));
        }

        let password_ok = password::verify_password(&input.password, &owner.password_hash)?;
        if !password_ok {
            // Atomic counter bump; the lockout check reads these on the
            // next attempt
            sqlx::query(
                r#"
                UPDATE owners
                SET failed_login_attempts = failed_login_attempts + 1,
                    last_failed_login_at = now()
                WHERE id = $1
                "#,
            )
            .bind(owner.id)
            .execute(&self.pool)
            .await?;

            warn!(owner_id = %owner.id, "login failed: invalid credentials");
            return Err(ServiceError::unauthorized("Invalid credentials"));
        }

        sqlx::query(
            r#"
            UPDATE owners
            SET failed_login_attempts = 0,
                last_failed_login_at = NULL,
                last_login_at = now()
            WHERE id = $1
            "#,
        )
        .bind(owner.id)
        .execute(&self.pool)
        .await?;

        info!(owner_id = %owner.id, "login success");

        let tokens = self.issue_tokens(&owner, device).await?;
        Ok((OwnerProfile::from(&owner), tokens))
    }

    /// Rotate a refresh token: the presented jti must match the live session
    /// for the token's device; the session is re-keyed so the old token can
    /// never mint again.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(OwnerProfile, AuthTokens), ServiceError> {
        let claims = auth::verify_token(refresh_token, TokenKind::Refresh)?;
        let device_id = claims
            .device_id
            .ok_or_else(|| ServiceError::unauthorized("Invalid refresh token"))?;

        let session: Option<RefreshSession> = sqlx::query_as(
            "SELECT * FROM refresh_sessions WHERE owner_id = $1 AND device_id = $2",
        )
        .bind(claims.uid)
        .bind(&device_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(session) = session else {
            return Err(ServiceError::unauthorized("Session not found"));
        };
        if !session.is_live(Utc::now()) || session.jti != claims.jti {
            warn!(owner_id = %claims.uid, device_id, "refresh refused: stale or revoked session");
            return Err(ServiceError::unauthorized("Refresh token no longer valid"));
        }

        let owner = self.find_active_owner(claims.uid).await?;

        let tokens = self
            .issue_tokens(
                &owner,
                DeviceInfo {
                    device_id: Some(device_id),
                    device_type: session.device_type.clone(),
                },
            )
            .await?;

        info!(owner_id = %owner.id, "tokens refreshed");
        Ok((OwnerProfile::from(&owner), tokens))
    }

    /// Revoke the device's refresh session. Idempotent.
    pub async fn logout(&self, owner_id: Uuid, device_id: &str) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked_at = now()
            WHERE owner_id = $1 AND device_id = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(owner_id)
        .bind(device_id)
        .execute(&self.pool)
        .await?;

        info!(owner_id = %owner_id, device_id, "logout");
        Ok(())
    }

    /// Owner lookup for the auth middleware and /auth/me.
    pub async fn find_active_owner(&self, owner_id: Uuid) -> Result<Owner, ServiceError> {
        let owner: Option<Owner> = sqlx::query_as("SELECT * FROM owners WHERE id = $1")
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match owner {
            Some(owner) if owner.is_active => Ok(owner),
            Some(_) => Err(ServiceError::unauthorized("Account is inactive")),
            None => Err(ServiceError::unauthorized("Account not found")),
        }
    }

    async fn issue_tokens(&self, owner: &Owner, device: DeviceInfo) -> Result<AuthTokens, ServiceError> {
        let device_id = device.device_id.unwrap_or_else(auth::random_token_id);

        let refresh_claims = Claims::refresh(owner.id, device_id.clone());
        let expires_at = Utc
            .timestamp_opt(refresh_claims.exp, 0)
            .single()
            .unwrap_or_else(|| Utc::now() + Duration::days(config::config().security.refresh_token_ttl_days));

        sqlx::query(
            r#"
            INSERT INTO refresh_sessions (owner_id, device_id, device_type, jti, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (owner_id, device_id) DO UPDATE
            SET jti = EXCLUDED.jti,
                device_type = EXCLUDED.device_type,
                expires_at = EXCLUDED.expires_at,
                revoked_at = NULL
            "#,
        )
        .bind(owner.id)
        .bind(&device_id)
        .bind(&device.device_type)
        .bind(&refresh_claims.jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        let access_claims = Claims::access(owner.id);
        let access_token = auth::generate_jwt(&access_claims)?;
        let refresh_token = auth::generate_jwt(&refresh_claims)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "bearer",
            expires_in: config::config().security.access_token_ttl_minutes * 60,
            device_id,
        })
    }
}

/// Locked when the failure counter has reached the limit and the lockout
/// window since the last failure has not yet elapsed.
pub fn is_account_locked(owner: &Owner, now: DateTime<Utc>) -> bool {
    let security = &config::config().security;
    if owner.failed_login_attempts < security.max_failed_login_attempts {
        return false;
    }
    match owner.last_failed_login_at {
        Some(last_failed) => now < last_failed + Duration::minutes(security.lockout_minutes),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_with_failures(attempts: i32, last_failed: Option<DateTime<Utc>>) -> Owner {
        let now = Utc::now();
        Owner {
            id: Uuid::new_v4(),
            name: "owner1".to_string(),
            email: "owner1@example.com".to_string(),
            phone: None,
            password_hash: "x".to_string(),
            is_active: true,
            failed_login_attempts: attempts,
            last_failed_login_at: last_failed,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn under_the_limit_is_not_locked() {
        let owner = owner_with_failures(4, Some(Utc::now()));
        assert!(!is_account_locked(&owner, Utc::now()));
    }

    #[test]
    fn recent_failures_at_limit_lock_the_account() {
        let owner = owner_with_failures(5, Some(Utc::now()));
        assert!(is_account_locked(&owner, Utc::now()));
    }

    #[test]
    fn lock_expires_after_the_window() {
        let last_failed = Utc::now() - Duration::minutes(16);
        let owner = owner_with_failures(7, Some(last_failed));
        assert!(!is_account_locked(&owner, Utc::now()));
    }

    #[test]
    fn missing_failure_timestamp_never_locks() {
        let owner = owner_with_failures(99, None);
        assert!(!is_account_locked(&owner, Utc::now()));
    }
}
