use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::services::property_service::fetch_owned_property;
use crate::services::ServiceError;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DashboardCounts {
    pub total_buildings: i64,
    pub total_rooms: i64,
    pub total_beds: i64,
    pub occupied_beds: i64,
    pub total_members: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub counts: DashboardCounts,
    pub available_beds: i64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub property_count: i64,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Aggregates for a single property.
    pub async fn property_stats(&self, owner_id: Uuid, property_id: Uuid) -> Result<DashboardStats, ServiceError> {
        fetch_owned_property(&self.pool, owner_id, property_id).await?;

        let counts: DashboardCounts = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM buildings WHERE property_id = $1) AS total_buildings,
                (SELECT COUNT(*) FROM rooms WHERE property_id = $1) AS total_rooms,
                (SELECT COUNT(*) FROM beds WHERE property_id = $1) AS total_beds,
                (SELECT COUNT(*) FROM beds WHERE property_id = $1 AND is_occupied) AS occupied_beds,
                (SELECT COUNT(*) FROM members WHERE property_id = $1) AS total_members,
                (SELECT COALESCE(SUM(amount), 0) FROM payments WHERE property_id = $1) AS total_revenue
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats_from_counts(counts))
    }

    /// The same aggregate across all of the caller's properties.
    pub async fn owner_summary(&self, owner_id: Uuid) -> Result<DashboardSummary, ServiceError> {
        let (property_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM properties WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        let counts: DashboardCounts = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM buildings WHERE owner_id = $1) AS total_buildings,
                (SELECT COUNT(*) FROM rooms WHERE owner_id = $1) AS total_rooms,
                (SELECT COUNT(*) FROM beds WHERE owner_id = $1) AS total_beds,
                (SELECT COUNT(*) FROM beds WHERE owner_id = $1 AND is_occupied) AS occupied_beds,
                (SELECT COUNT(*) FROM members WHERE owner_id = $1) AS total_members,
                (SELECT COALESCE(SUM(amount), 0) FROM payments WHERE owner_id = $1) AS total_revenue
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            property_count,
            stats: stats_from_counts(counts),
        })
    }
}

fn stats_from_counts(counts: DashboardCounts) -> DashboardStats {
    DashboardStats {
        available_beds: counts.total_beds - counts.occupied_beds,
        occupancy_rate: occupancy_rate(counts.occupied_beds, counts.total_beds),
        counts,
    }
}

/// Percentage rounded to two decimals; 0 when there are no beds.
pub fn occupancy_rate(occupied: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = occupied as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_without_beds() {
        assert_eq!(occupancy_rate(0, 0), 0.0);
        assert_eq!(occupancy_rate(5, 0), 0.0);
    }

    #[test]
    fn rate_rounds_to_two_decimals() {
        assert_eq!(occupancy_rate(1, 3), 33.33);
        assert_eq!(occupancy_rate(2, 3), 66.67);
        assert_eq!(occupancy_rate(3, 3), 100.0);
    }

    #[test]
    fn available_beds_derived_from_counts() {
        let stats = stats_from_counts(DashboardCounts {
            total_buildings: 1,
            total_rooms: 4,
            total_beds: 10,
            occupied_beds: 4,
            total_members: 4,
            total_revenue: Decimal::ZERO,
        });
        assert_eq!(stats.available_beds, 6);
        assert_eq!(stats.occupancy_rate, 40.0);
    }
}
