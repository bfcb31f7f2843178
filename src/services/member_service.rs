use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Bed, Member};
use crate::services::property_service::{fetch_owned_property, fetch_owned_property_tx};
use crate::services::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CreateMemberInput {
    pub property_id: Uuid,
    pub bed_id: Option<Uuid>,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub document_id: Option<String>,
    pub check_in_date: Option<DateTime<Utc>>,
    pub deposit_amount: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMemberInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub document_id: Option<String>,
    pub check_in_date: Option<DateTime<Utc>>,
    pub deposit_amount: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl UpdateMemberInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.document_id.is_none()
            && self.check_in_date.is_none()
            && self.deposit_amount.is_none()
            && self.is_active.is_none()
    }
}

pub struct MemberService {
    pool: PgPool,
}

impl MemberService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub async fn create_member(&self, owner_id: Uuid, input: CreateMemberInput) -> Result<Member, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::invalid("Member name is required"));
        }
        if input.phone.trim().is_empty() {
            return Err(ServiceError::invalid("Member phone is required"));
        }

        let mut tx = self.pool.begin().await?;

        let property = fetch_owned_property_tx(&mut tx, owner_id, input.property_id).await?;

        if let Some(bed_id) = input.bed_id {
            let bed = fetch_owned_bed_tx(&mut tx, owner_id, bed_id).await?;
            if bed.property_id != property.id {
                return Err(ServiceError::invalid("Bed does not belong to this property"));
            }
            ensure_bed_free(&mut tx, &bed, None).await?;
            occupy_bed(&mut tx, bed.id).await?;
        }

        let member: Member = sqlx::query_as(
            r#"
            INSERT INTO members
                (property_id, owner_id, bed_id, name, phone, address, document_id, check_in_date, deposit_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(property.id)
        .bind(owner_id)
        .bind(input.bed_id)
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(&input.address)
        .bind(&input.document_id)
        .bind(input.check_in_date)
        .bind(input.deposit_amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(owner_id = %owner_id, member_id = %member.id, property_id = %property.id, "member created");
        Ok(member)
    }

    /// Members of one property, or of all the caller's properties when no
    /// filter is given.
    pub async fn list_members(
        &self,
        owner_id: Uuid,
        property_id: Option<Uuid>,
    ) -> Result<Vec<Member>, ServiceError> {
        let members = match property_id {
            Some(property_id) => {
                fetch_owned_property(&self.pool, owner_id, property_id).await?;
                sqlx::query_as("SELECT * FROM members WHERE property_id = $1 ORDER BY created_at")
                    .bind(property_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM members WHERE owner_id = $1 ORDER BY created_at")
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(members)
    }

    pub async fn get_member(&self, owner_id: Uuid, member_id: Uuid) -> Result<Member, ServiceError> {
        fetch_owned_member(&self.pool, owner_id, member_id).await
    }

    pub async fn update_member(
        &self,
        owner_id: Uuid,
        member_id: Uuid,
        input: UpdateMemberInput,
    ) -> Result<Member, ServiceError> {
        let member = fetch_owned_member(&self.pool, owner_id, member_id).await?;

        if input.is_empty() {
            return Ok(member);
        }

        let updated: Member = sqlx::query_as(
            r#"
            UPDATE members
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                document_id = COALESCE($5, document_id),
                check_in_date = COALESCE($6, check_in_date),
                deposit_amount = COALESCE($7, deposit_amount),
                is_active = COALESCE($8, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(member.id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.document_id)
        .bind(input.check_in_date)
        .bind(input.deposit_amount)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;

        info!(owner_id = %owner_id, member_id = %member_id, "member updated");
        Ok(updated)
    }

    /// Delete a member, freeing any bed they occupied. Their payments go
    /// with them (FK cascade).
    pub async fn delete_member(&self, owner_id: Uuid, member_id: Uuid) -> Result<(), ServiceError> {
        let member = fetch_owned_member(&self.pool, owner_id, member_id).await?;

        let mut tx = self.pool.begin().await?;

        if let Some(bed_id) = member.bed_id {
            free_bed(&mut tx, bed_id).await?;
        }

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(owner_id = %owner_id, member_id = %member_id, "member deleted");
        Ok(())
    }

    /// Move a member onto a bed: frees the previous bed, occupies the new
    /// one. Assigning the member's current bed is a no-op.
    pub async fn assign_bed(&self, owner_id: Uuid, member_id: Uuid, bed_id: Uuid) -> Result<Member, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let member = fetch_owned_member_tx(&mut tx, owner_id, member_id).await?;
        let bed = fetch_owned_bed_tx(&mut tx, owner_id, bed_id).await?;

        if bed.property_id != member.property_id {
            return Err(ServiceError::invalid("Bed does not belong to the member's property"));
        }

        if member.bed_id == Some(bed.id) {
            return Ok(member);
        }

        ensure_bed_free(&mut tx, &bed, Some(member.id)).await?;

        if let Some(previous_bed) = member.bed_id {
            free_bed(&mut tx, previous_bed).await?;
        }
        occupy_bed(&mut tx, bed.id).await?;

        let updated: Member = sqlx::query_as(
            "UPDATE members SET bed_id = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(member.id)
        .bind(bed.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(owner_id = %owner_id, member_id = %member_id, bed_id = %bed_id, "member assigned to bed");
        Ok(updated)
    }

    pub async fn unassign_bed(&self, owner_id: Uuid, member_id: Uuid) -> Result<Member, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let member = fetch_owned_member_tx(&mut tx, owner_id, member_id).await?;
        let Some(bed_id) = member.bed_id else {
            return Err(ServiceError::invalid("Member is not assigned to any bed"));
        };

        free_bed(&mut tx, bed_id).await?;

        let updated: Member = sqlx::query_as(
            "UPDATE members SET bed_id = NULL, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(member.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(owner_id = %owner_id, member_id = %member_id, bed_id = %bed_id, "member unassigned from bed");
        Ok(updated)
    }
}

pub async fn fetch_owned_member(pool: &PgPool, owner_id: Uuid, member_id: Uuid) -> Result<Member, ServiceError> {
    let member: Option<Member> = sqlx::query_as("SELECT * FROM members WHERE id = $1")
        .bind(member_id)
        .fetch_optional(pool)
        .await?;

    let member = member.ok_or_else(|| ServiceError::not_found("Member not found"))?;
    if member.owner_id != owner_id {
        warn!(owner_id = %owner_id, member_id = %member_id, "unauthorized member access");
        return Err(ServiceError::forbidden("Not allowed"));
    }
    Ok(member)
}

async fn fetch_owned_member_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    member_id: Uuid,
) -> Result<Member, ServiceError> {
    let member: Option<Member> = sqlx::query_as("SELECT * FROM members WHERE id = $1")
        .bind(member_id)
        .fetch_optional(&mut **tx)
        .await?;

    let member = member.ok_or_else(|| ServiceError::not_found("Member not found"))?;
    if member.owner_id != owner_id {
        return Err(ServiceError::forbidden("Not allowed"));
    }
    Ok(member)
}

async fn fetch_owned_bed_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    bed_id: Uuid,
) -> Result<Bed, ServiceError> {
    let bed: Option<Bed> = sqlx::query_as("SELECT * FROM beds WHERE id = $1")
        .bind(bed_id)
        .fetch_optional(&mut **tx)
        .await?;

    let bed = bed.ok_or_else(|| ServiceError::not_found("Bed not found"))?;
    if bed.owner_id != owner_id {
        return Err(ServiceError::forbidden("Not authorized to use this bed"));
    }
    Ok(bed)
}

/// 409 with the occupant's name when the bed is held by someone other than
/// `allow_member`.
async fn ensure_bed_free(
    tx: &mut Transaction<'_, Postgres>,
    bed: &Bed,
    allow_member: Option<Uuid>,
) -> Result<(), ServiceError> {
    let occupant: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, name FROM members WHERE bed_id = $1")
            .bind(bed.id)
            .fetch_optional(&mut **tx)
            .await?;

    if let Some((occupant_id, occupant_name)) = occupant {
        if Some(occupant_id) != allow_member {
            return Err(ServiceError::conflict(format!(
                "Bed {} is already occupied by {}",
                bed.bed_number, occupant_name
            )));
        }
    }
    Ok(())
}

async fn occupy_bed(tx: &mut Transaction<'_, Postgres>, bed_id: Uuid) -> Result<(), ServiceError> {
    sqlx::query("UPDATE beds SET is_occupied = TRUE WHERE id = $1")
        .bind(bed_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn free_bed(tx: &mut Transaction<'_, Postgres>, bed_id: Uuid) -> Result<(), ServiceError> {
    sqlx::query("UPDATE beds SET is_occupied = FALSE WHERE id = $1")
        .bind(bed_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_member_update_detected() {
        assert!(UpdateMemberInput::default().is_empty());
        let update = UpdateMemberInput {
            phone: Some("555-0100".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
