use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Bed, Building, Floor, Member, Property, Room};
use crate::services::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CreatePropertyInput {
    pub name: String,
    pub property_type: String,
    pub city: Option<String>,
    pub area: Option<String>,
    pub address_line: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub bed_pricing: Value,
    #[serde(default)]
    pub buildings: Vec<BuildingInput>,
}

#[derive(Debug, Deserialize)]
pub struct BuildingInput {
    pub name: String,
    #[serde(default)]
    pub floors: Vec<FloorInput>,
}

#[derive(Debug, Deserialize)]
pub struct FloorInput {
    pub label: String,
    #[serde(default)]
    pub rooms: Vec<RoomInput>,
}

#[derive(Debug, Deserialize)]
pub struct RoomInput {
    pub room_number: String,
    pub bed_count: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePropertyInput {
    pub name: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub address_line: Option<String>,
    pub phone: Option<String>,
    pub bed_pricing: Option<Value>,
    pub is_active: Option<bool>,
}

impl UpdatePropertyInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.area.is_none()
            && self.address_line.is_none()
            && self.phone.is_none()
            && self.bed_pricing.is_none()
            && self.is_active.is_none()
    }
}

/// Property decorated with subtree aggregate counts.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PropertySummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub property: Property,
    pub building_count: i64,
    pub room_count: i64,
    pub bed_count: i64,
    pub occupied_beds: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatedPropertyTree {
    pub property: Property,
    pub building_count: usize,
    pub floor_count: usize,
    pub room_count: usize,
    pub bed_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PropertyDetails {
    pub property: Property,
    pub buildings: Vec<BuildingDetail>,
    pub members: Vec<Member>,
    pub stats: PropertyStats,
}

#[derive(Debug, Serialize)]
pub struct BuildingDetail {
    #[serde(flatten)]
    pub building: Building,
    pub floors: Vec<FloorDetail>,
}

#[derive(Debug, Serialize)]
pub struct FloorDetail {
    #[serde(flatten)]
    pub floor: Floor,
    pub rooms: Vec<RoomDetail>,
}

#[derive(Debug, Serialize)]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub beds: Vec<Bed>,
}

#[derive(Debug, Default, Serialize)]
pub struct PropertyStats {
    pub building_count: i64,
    pub floor_count: i64,
    pub room_count: i64,
    pub bed_count: i64,
    pub occupied_beds: i64,
}

pub struct PropertyService {
    pool: PgPool,
}

impl PropertyService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create a property and its whole building/floor/room/bed subtree in
    /// one transaction.
    pub async fn create_property(
        &self,
        owner_id: Uuid,
        input: CreatePropertyInput,
    ) -> Result<CreatedPropertyTree, ServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("Property name is required"));
        }

        let property_type = normalize_property_type(&input.property_type)?;

        if !input.bed_pricing.is_null() && !input.bed_pricing.is_array() {
            return Err(ServiceError::invalid("bed_pricing must be a list"));
        }
        let bed_pricing = if input.bed_pricing.is_null() {
            Value::Array(vec![])
        } else {
            input.bed_pricing.clone()
        };

        for building in &input.buildings {
            if building.name.trim().is_empty() {
                return Err(ServiceError::invalid("Building name is required"));
            }
            for floor in &building.floors {
                for room in &floor.rooms {
                    if room.room_number.trim().is_empty() {
                        return Err(ServiceError::invalid("Room number is required"));
                    }
                    if room.bed_count < 1 {
                        return Err(ServiceError::invalid(format!(
                            "Room {} must have at least one bed",
                            room.room_number
                        )));
                    }
                }
            }
        }

        info!(owner_id = %owner_id, name, "property creation started");

        let mut tx = self.pool.begin().await?;

        let property: Property = sqlx::query_as(
            r#"
            INSERT INTO properties (owner_id, name, property_type, city, area, address_line, phone, bed_pricing)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(&property_type)
        .bind(&input.city)
        .bind(&input.area)
        .bind(&input.address_line)
        .bind(&input.phone)
        .bind(&bed_pricing)
        .fetch_one(&mut *tx)
        .await?;

        let mut floor_count = 0usize;
        let mut room_count = 0usize;
        let mut bed_count = 0usize;

        for building_input in &input.buildings {
            let building: Building = sqlx::query_as(
                r#"
                INSERT INTO buildings (property_id, owner_id, name, floor_count)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(property.id)
            .bind(owner_id)
            .bind(building_input.name.trim())
            .bind(building_input.floors.len() as i32)
            .fetch_one(&mut *tx)
            .await?;

            for floor_input in &building_input.floors {
                let floor: Floor = sqlx::query_as(
                    r#"
                    INSERT INTO floors (building_id, property_id, owner_id, floor_number, floor_label, room_count)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                    "#,
                )
                .bind(building.id)
                .bind(property.id)
                .bind(owner_id)
                .bind(floor_number_from_label(&floor_input.label))
                .bind(floor_input.label.trim())
                .bind(floor_input.rooms.len() as i32)
                .fetch_one(&mut *tx)
                .await?;
                floor_count += 1;

                for room_input in &floor_input.rooms {
                    let room: Room = sqlx::query_as(
                        r#"
                        INSERT INTO rooms (floor_id, building_id, property_id, owner_id, room_number, share_type)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        RETURNING *
                        "#,
                    )
                    .bind(floor.id)
                    .bind(building.id)
                    .bind(property.id)
                    .bind(owner_id)
                    .bind(room_input.room_number.trim())
                    .bind(room_input.bed_count)
                    .fetch_one(&mut *tx)
                    .await?;
                    room_count += 1;

                    for bed_number in 1..=room_input.bed_count {
                        sqlx::query(
                            r#"
                            INSERT INTO beds (room_id, property_id, owner_id, bed_number)
                            VALUES ($1, $2, $3, $4)
                            "#,
                        )
                        .bind(room.id)
                        .bind(property.id)
                        .bind(owner_id)
                        .bind(bed_number)
                        .execute(&mut *tx)
                        .await?;
                        bed_count += 1;
                    }
                }
            }
        }

        tx.commit().await?;

        info!(
            owner_id = %owner_id,
            property_id = %property.id,
            floors = floor_count,
            rooms = room_count,
            beds = bed_count,
            "property creation successful"
        );

        Ok(CreatedPropertyTree {
            building_count: input.buildings.len(),
            floor_count,
            room_count,
            bed_count,
            property,
        })
    }

    /// Owner's properties, each with aggregate counts computed in SQL.
    pub async fn list_properties(
        &self,
        owner_id: Uuid,
        property_type: Option<&str>,
    ) -> Result<Vec<PropertySummary>, ServiceError> {
        let property_type = property_type.map(normalize_property_type).transpose()?;

        let summaries: Vec<PropertySummary> = sqlx::query_as(
            r#"
            SELECT p.*,
                (SELECT COUNT(*) FROM buildings b WHERE b.property_id = p.id) AS building_count,
                (SELECT COUNT(*) FROM rooms r WHERE r.property_id = p.id) AS room_count,
                (SELECT COUNT(*) FROM beds bd WHERE bd.property_id = p.id) AS bed_count,
                (SELECT COUNT(*) FROM beds bd WHERE bd.property_id = p.id AND bd.is_occupied) AS occupied_beds
            FROM properties p
            WHERE p.owner_id = $1
              AND ($2::text IS NULL OR p.property_type = $2)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(property_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    pub async fn get_property(&self, owner_id: Uuid, property_id: Uuid) -> Result<Property, ServiceError> {
        fetch_owned_property(&self.pool, owner_id, property_id).await
    }

    /// Full tree: property, nested buildings/floors/rooms/beds, members and
    /// aggregate stats. Five queries, assembled in memory.
    pub async fn get_property_details(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
    ) -> Result<PropertyDetails, ServiceError> {
        let property = fetch_owned_property(&self.pool, owner_id, property_id).await?;

        let buildings: Vec<Building> =
            sqlx::query_as("SELECT * FROM buildings WHERE property_id = $1 ORDER BY created_at")
                .bind(property_id)
                .fetch_all(&self.pool)
                .await?;

        let floors: Vec<Floor> =
            sqlx::query_as("SELECT * FROM floors WHERE property_id = $1 ORDER BY floor_number")
                .bind(property_id)
                .fetch_all(&self.pool)
                .await?;

        let rooms: Vec<Room> =
            sqlx::query_as("SELECT * FROM rooms WHERE property_id = $1 ORDER BY room_number")
                .bind(property_id)
                .fetch_all(&self.pool)
                .await?;

        let beds: Vec<Bed> =
            sqlx::query_as("SELECT * FROM beds WHERE property_id = $1 ORDER BY bed_number")
                .bind(property_id)
                .fetch_all(&self.pool)
                .await?;

        let members: Vec<Member> =
            sqlx::query_as("SELECT * FROM members WHERE property_id = $1 ORDER BY created_at")
                .bind(property_id)
                .fetch_all(&self.pool)
                .await?;

        let stats = PropertyStats {
            building_count: buildings.len() as i64,
            floor_count: floors.len() as i64,
            room_count: rooms.len() as i64,
            bed_count: beds.len() as i64,
            occupied_beds: beds.iter().filter(|b| b.is_occupied).count() as i64,
        };

        let mut beds_by_room: HashMap<Uuid, Vec<Bed>> = HashMap::new();
        for bed in beds {
            beds_by_room.entry(bed.room_id).or_default().push(bed);
        }

        let mut rooms_by_floor: HashMap<Uuid, Vec<RoomDetail>> = HashMap::new();
        for room in rooms {
            let beds = beds_by_room.remove(&room.id).unwrap_or_default();
            rooms_by_floor
                .entry(room.floor_id)
                .or_default()
                .push(RoomDetail { room, beds });
        }

        let mut floors_by_building: HashMap<Uuid, Vec<FloorDetail>> = HashMap::new();
        for floor in floors {
            let rooms = rooms_by_floor.remove(&floor.id).unwrap_or_default();
            floors_by_building
                .entry(floor.building_id)
                .or_default()
                .push(FloorDetail { floor, rooms });
        }

        let buildings = buildings
            .into_iter()
            .map(|building| {
                let floors = floors_by_building.remove(&building.id).unwrap_or_default();
                BuildingDetail { building, floors }
            })
            .collect();

        if !rooms_by_floor.is_empty() || !floors_by_building.is_empty() {
            warn!(property_id = %property_id, "detail tree has unattached rows");
        }

        Ok(PropertyDetails {
            property,
            buildings,
            members,
            stats,
        })
    }

    pub async fn update_property(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
        input: UpdatePropertyInput,
    ) -> Result<Property, ServiceError> {
        let property = fetch_owned_property(&self.pool, owner_id, property_id).await?;

        if input.is_empty() {
            return Ok(property);
        }

        if let Some(pricing) = &input.bed_pricing {
            if !pricing.is_array() {
                return Err(ServiceError::invalid("bed_pricing must be a list"));
            }
        }

        let updated: Property = sqlx::query_as(
            r#"
            UPDATE properties
            SET name = COALESCE($2, name),
                city = COALESCE($3, city),
                area = COALESCE($4, area),
                address_line = COALESCE($5, address_line),
                phone = COALESCE($6, phone),
                bed_pricing = COALESCE($7, bed_pricing),
                is_active = COALESCE($8, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.area)
        .bind(&input.address_line)
        .bind(&input.phone)
        .bind(&input.bed_pricing)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;

        info!(owner_id = %owner_id, property_id = %property_id, "property updated");
        Ok(updated)
    }

    /// Delete the property and its entire subtree (buildings, floors, rooms,
    /// beds, members, payments) via FK cascade.
    pub async fn delete_property(&self, owner_id: Uuid, property_id: Uuid) -> Result<(), ServiceError> {
        fetch_owned_property(&self.pool, owner_id, property_id).await?;

        sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        info!(owner_id = %owner_id, property_id = %property_id, "property deleted");
        Ok(())
    }

    pub async fn list_buildings(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
    ) -> Result<Vec<Building>, ServiceError> {
        fetch_owned_property(&self.pool, owner_id, property_id).await?;

        let buildings =
            sqlx::query_as("SELECT * FROM buildings WHERE property_id = $1 ORDER BY created_at")
                .bind(property_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(buildings)
    }

    pub async fn list_floors(&self, owner_id: Uuid, building_id: Uuid) -> Result<Vec<Floor>, ServiceError> {
        let building: Option<Building> = sqlx::query_as("SELECT * FROM buildings WHERE id = $1")
            .bind(building_id)
            .fetch_optional(&self.pool)
            .await?;
        let building = building.ok_or_else(|| ServiceError::not_found("Building not found"))?;
        if building.owner_id != owner_id {
            return Err(ServiceError::forbidden("Not authorized to view these floors"));
        }

        let floors =
            sqlx::query_as("SELECT * FROM floors WHERE building_id = $1 ORDER BY floor_number")
                .bind(building_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(floors)
    }

    pub async fn list_rooms(&self, owner_id: Uuid, floor_id: Uuid) -> Result<Vec<Room>, ServiceError> {
        let floor: Option<Floor> = sqlx::query_as("SELECT * FROM floors WHERE id = $1")
            .bind(floor_id)
            .fetch_optional(&self.pool)
            .await?;
        let floor = floor.ok_or_else(|| ServiceError::not_found("Floor not found"))?;
        if floor.owner_id != owner_id {
            return Err(ServiceError::forbidden("Not authorized to view these rooms"));
        }

        let rooms = sqlx::query_as("SELECT * FROM rooms WHERE floor_id = $1 ORDER BY room_number")
            .bind(floor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rooms)
    }

    pub async fn list_beds(&self, owner_id: Uuid, room_id: Uuid) -> Result<Vec<Bed>, ServiceError> {
        let room = self.fetch_owned_room(owner_id, room_id).await?;

        let beds = sqlx::query_as("SELECT * FROM beds WHERE room_id = $1 ORDER BY bed_number")
            .bind(room.id)
            .fetch_all(&self.pool)
            .await?;
        Ok(beds)
    }

    pub async fn get_bed(&self, owner_id: Uuid, bed_id: Uuid) -> Result<Bed, ServiceError> {
        let bed: Option<Bed> = sqlx::query_as("SELECT * FROM beds WHERE id = $1")
            .bind(bed_id)
            .fetch_optional(&self.pool)
            .await?;
        let bed = bed.ok_or_else(|| ServiceError::not_found("Bed not found"))?;
        if bed.owner_id != owner_id {
            return Err(ServiceError::forbidden("Not authorized to view this bed"));
        }
        Ok(bed)
    }

    /// Delete a room and its beds; refused while any bed is occupied.
    pub async fn delete_room(&self, owner_id: Uuid, room_id: Uuid) -> Result<(), ServiceError> {
        let room = self.fetch_owned_room(owner_id, room_id).await?;

        let (occupied,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM beds WHERE room_id = $1 AND is_occupied")
                .bind(room.id)
                .fetch_one(&self.pool)
                .await?;
        if occupied > 0 {
            return Err(ServiceError::conflict(format!(
                "Room {} still has {} occupied bed(s)",
                room.room_number, occupied
            )));
        }

        sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(room.id)
            .execute(&self.pool)
            .await?;

        info!(owner_id = %owner_id, room_id = %room_id, "room deleted");
        Ok(())
    }

    async fn fetch_owned_room(&self, owner_id: Uuid, room_id: Uuid) -> Result<Room, ServiceError> {
        let room: Option<Room> = sqlx::query_as("SELECT * FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;
        let room = room.ok_or_else(|| ServiceError::not_found("Room not found"))?;
        if room.owner_id != owner_id {
            return Err(ServiceError::forbidden("Not authorized to access this room"));
        }
        Ok(room)
    }
}

/// Shared ownership gate: 404 when the property does not exist, 403 when it
/// belongs to someone else.
pub async fn fetch_owned_property(
    pool: &PgPool,
    owner_id: Uuid,
    property_id: Uuid,
) -> Result<Property, ServiceError> {
    let property: Option<Property> = sqlx::query_as("SELECT * FROM properties WHERE id = $1")
        .bind(property_id)
        .fetch_optional(pool)
        .await?;

    let property = property.ok_or_else(|| ServiceError::not_found("Property not found"))?;
    if property.owner_id != owner_id {
        warn!(owner_id = %owner_id, property_id = %property_id, "unauthorized property access");
        return Err(ServiceError::forbidden("Not allowed"));
    }
    Ok(property)
}

/// Transaction-scoped variant of [`fetch_owned_property`].
pub async fn fetch_owned_property_tx(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    property_id: Uuid,
) -> Result<Property, ServiceError> {
    let property: Option<Property> = sqlx::query_as("SELECT * FROM properties WHERE id = $1")
        .bind(property_id)
        .fetch_optional(&mut **tx)
        .await?;

    let property = property.ok_or_else(|| ServiceError::not_found("Property not found"))?;
    if property.owner_id != owner_id {
        return Err(ServiceError::forbidden("Not allowed"));
    }
    Ok(property)
}

/// "hostel/pg" and "HOSTEL/PG" normalize to HOSTEL, matching what the
/// mobile wizard sends.
fn normalize_property_type(raw: &str) -> Result<String, ServiceError> {
    let normalized = raw.trim().to_uppercase();
    let normalized = normalized.strip_suffix("/PG").unwrap_or(&normalized);
    match normalized {
        "HOSTEL" | "APARTMENT" => Ok(normalized.to_string()),
        _ => Err(ServiceError::invalid(
            "property_type must be HOSTEL or APARTMENT",
        )),
    }
}

/// "G" is the ground floor; unparseable labels sort below ground.
fn floor_number_from_label(label: &str) -> i32 {
    let label = label.trim();
    if label.eq_ignore_ascii_case("g") {
        return 0;
    }
    label.parse::<i32>().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_normalization() {
        assert_eq!(normalize_property_type("hostel").unwrap(), "HOSTEL");
        assert_eq!(normalize_property_type("Hostel/PG").unwrap(), "HOSTEL");
        assert_eq!(normalize_property_type("APARTMENT").unwrap(), "APARTMENT");
        assert!(normalize_property_type("villa").is_err());
    }

    #[test]
    fn floor_labels_map_to_numbers() {
        assert_eq!(floor_number_from_label("G"), 0);
        assert_eq!(floor_number_from_label("g"), 0);
        assert_eq!(floor_number_from_label("3"), 3);
        assert_eq!(floor_number_from_label("basement"), -1);
    }

    #[test]
    fn empty_update_detected() {
        assert!(UpdatePropertyInput::default().is_empty());
        let update = UpdatePropertyInput {
            name: Some("Sunrise Hostel".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
