pub(crate) mod query;
pub(crate) mod unit;

use rocket::fairing::{self, AdHoc};
use rocket::{Build, Rocket};

use rocket_db_pools::{sqlx, sqlx::FromRow, Database};

use time::OffsetDateTime;

use crate::climate::ClimateUnit;
use crate::error::ClimateError;

// Create a database for climate units.
#[derive(Database)]
#[database("climate")]
pub(crate) struct Units(sqlx::SqlitePool);

// Climate unit record.
#[derive(Debug, FromRow)]
pub(crate) struct UnitRow {
    // Identifier.
    id: i64,
    // Power state.
    powered_on: bool,
    // Target temperature.
    target_temperature: i64,
    // Operating mode name.
    mode: String,
    // Fan speed name.
    fan_speed: String,
    // Instant of the last power on.
    powered_on_since: Option<OffsetDateTime>,
}

impl TryFrom<UnitRow> for ClimateUnit {
    type Error = ClimateError;

    fn try_from(row: UnitRow) -> Result<Self, Self::Error> {
        let corrupted = |e: ClimateError| ClimateError::Corrupted {
            id: row.id,
            reason: e.to_string(),
        };

        Ok(Self {
            id: row.id,
            powered_on: row.powered_on,
            // Range repairs happen in `ClimateUnit::settle`, so they get saved.
            target_temperature: row.target_temperature,
            mode: row.mode.parse().map_err(corrupted)?,
            fan_speed: row.fan_speed.parse().map_err(corrupted)?,
            powered_on_since: row.powered_on_since,
        })
    }
}

// Runs database migrations scripts.
//
// All database tables are created during this phase.
async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    match Units::fetch(&rocket) {
        Some(db) => match sqlx::migrate!("db/migrations").run(&**db).await {
            Ok(_) => Ok(rocket),
            Err(e) => {
                tracing::error!("Failed to initialize SQLx database: {}", e);
                Err(rocket)
            }
        },
        None => Err(rocket),
    }
}

// Create a middle layer to define the database during server creation.
pub(crate) fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket
            .attach(Units::init())
            .attach(AdHoc::try_on_ignite("SQLx Migrations", run_migrations))
    })
}
