use rocket_db_pools::Connection;

use time::OffsetDateTime;

use tracing::{debug, info};

use crate::climate::{ClimateUnit, Observation};
use crate::drift::Drift;
use crate::error::ClimateError;
use crate::locks::UnitLocks;

use super::query::{insert_unit, select_all_units, select_first_unit, select_unit, update_unit};
use super::Units;

/// A user action on a climate unit.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Action<'a> {
    TogglePower,
    IncreaseTemperature,
    DecreaseTemperature,
    SetMode(&'a str),
    SetFanSpeed(&'a str),
}

impl Action<'_> {
    // Returns whether the unit changed.
    fn apply(self, unit: &mut ClimateUnit, now: OffsetDateTime) -> Result<bool, ClimateError> {
        match self {
            Self::TogglePower => {
                unit.toggle_power(now);
                Ok(true)
            }
            Self::IncreaseTemperature => Ok(unit.increase_temperature()),
            Self::DecreaseTemperature => Ok(unit.decrease_temperature()),
            Self::SetMode(mode) => unit.set_mode(mode),
            Self::SetFanSpeed(fan_speed) => unit.set_fan_speed(fan_speed),
        }
    }
}

async fn fetch_unit(db: &mut Connection<Units>, id: i64) -> Result<ClimateUnit, ClimateError> {
    select_unit(db, id)
        .await?
        .ok_or(ClimateError::NotFound(id))?
        .try_into()
}

/// Returns the unit with the given identifier.
///
/// Without an identifier, the first stored unit is returned, and a unit with
/// default settings is created when none exists.
pub(crate) async fn get_or_create(
    db: &mut Connection<Units>,
    locks: &UnitLocks,
    id: Option<i64>,
) -> Result<ClimateUnit, ClimateError> {
    if let Some(id) = id {
        return fetch_unit(db, id).await;
    }

    if let Some(row) = select_first_unit(db).await? {
        return row.try_into();
    }

    let _creation = locks.lock_creation().await;

    // Another request may have created the unit in the meantime.
    if let Some(row) = select_first_unit(db).await? {
        return row.try_into();
    }

    let mut unit = ClimateUnit::default();
    unit.id = insert_unit(db, &unit).await?;
    info!(id = unit.id, "Climate unit created");

    Ok(unit)
}

/// Reads a unit for display, along with how long it has been on.
pub(crate) async fn observe(
    db: &mut Connection<Units>,
    locks: &UnitLocks,
    drift: &Drift,
    id: Option<i64>,
) -> Result<Observation, ClimateError> {
    let id = get_or_create(db, locks, id).await?.id;
    let _guard = locks.lock(id).await;

    let mut unit = fetch_unit(db, id).await?;
    let now = OffsetDateTime::now_utc();
    let step = if unit.powered_on { drift.sample() } else { None };

    if unit.observe(now, step) {
        update_unit(db, &unit).await?;
        debug!(
            id,
            target_temperature = unit.target_temperature,
            since = ?unit.powered_on_since,
            "Climate unit settled"
        );
    }

    Ok(Observation::new(unit, now))
}

/// Applies an action to a unit and saves it when changed.
pub(crate) async fn apply(
    db: &mut Connection<Units>,
    locks: &UnitLocks,
    id: Option<i64>,
    action: Action<'_>,
) -> Result<ClimateUnit, ClimateError> {
    let id = get_or_create(db, locks, id).await?.id;
    let _guard = locks.lock(id).await;

    let mut unit = fetch_unit(db, id).await?;
    let now = OffsetDateTime::now_utc();
    let settled = unit.settle(now);
    let changed = action.apply(&mut unit, now)?;
    if settled || changed {
        update_unit(db, &unit).await?;
        info!(
            id,
            ?action,
            powered_on = unit.powered_on,
            target_temperature = unit.target_temperature,
            mode = %unit.mode,
            fan_speed = %unit.fan_speed,
            "Climate unit updated"
        );
    } else {
        debug!(id, ?action, "Action had no effect");
    }

    Ok(unit)
}

/// Returns all stored units, as they are saved.
pub(crate) async fn all_units(db: &mut Connection<Units>) -> Result<Vec<ClimateUnit>, ClimateError> {
    select_all_units(db)
        .await?
        .into_iter()
        .map(ClimateUnit::try_from)
        .collect()
}
