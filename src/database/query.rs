use rocket_db_pools::{sqlx, Connection};

use crate::climate::ClimateUnit;

use super::{UnitRow, Units};

// Return a climate unit by identifier.
#[inline]
pub(crate) async fn select_unit(
    db: &mut Connection<Units>,
    id: i64,
) -> Result<Option<UnitRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, powered_on, target_temperature, mode, fan_speed, powered_on_since FROM climate_units WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut ***db)
    .await
}

// Return the climate unit with the lowest identifier.
#[inline]
pub(crate) async fn select_first_unit(
    db: &mut Connection<Units>,
) -> Result<Option<UnitRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, powered_on, target_temperature, mode, fan_speed, powered_on_since FROM climate_units ORDER BY id LIMIT 1",
    )
    .fetch_optional(&mut ***db)
    .await
}

// Return all climate units.
#[inline]
pub(crate) async fn select_all_units(
    db: &mut Connection<Units>,
) -> Result<Vec<UnitRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, powered_on, target_temperature, mode, fan_speed, powered_on_since FROM climate_units ORDER BY id",
    )
    .fetch_all(&mut ***db)
    .await
}

// Insert a climate unit in the database returning the associated identifier.
//
// The identifier of the given unit is ignored.
pub(crate) async fn insert_unit(
    db: &mut Connection<Units>,
    unit: &ClimateUnit,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO climate_units(powered_on, target_temperature, mode, fan_speed, powered_on_since) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(unit.powered_on)
    .bind(unit.target_temperature)
    .bind(unit.mode.as_str())
    .bind(unit.fan_speed.as_str())
    .bind(unit.powered_on_since)
    .fetch_one(&mut ***db)
    .await
}

// Save the state of a climate unit.
pub(crate) async fn update_unit(
    db: &mut Connection<Units>,
    unit: &ClimateUnit,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE climate_units SET powered_on = $1, target_temperature = $2, mode = $3, fan_speed = $4, powered_on_since = $5 WHERE id = $6",
    )
    .bind(unit.powered_on)
    .bind(unit.target_temperature)
    .bind(unit.mode.as_str())
    .bind(unit.fan_speed.as_str())
    .bind(unit.powered_on_since)
    .bind(unit.id)
    .execute(&mut ***db)
    .await?;
    Ok(())
}
