#[macro_use]
extern crate rocket;

mod climate;
mod config;
mod database;
mod drift;
mod error;
mod form;
mod inputs;
mod locks;


// Web app
use rocket::figment::Figment;
use rocket::form::Form;
use rocket::http::uri::Origin;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{Build, Rocket, State};

// Templates engine
use rocket_dyn_templates::Template;

// Database
use rocket_db_pools::Connection;

// Logger
use tracing_subscriber::EnvFilter;

use crate::climate::{ClimateUnit, Observation};
use crate::database::unit::{self, Action};
use crate::database::Units;
use crate::drift::Drift;
use crate::error::{panel_error, PanelError};
use crate::form::Panel;
use crate::inputs::{FanSpeedInput, ModeInput};
use crate::locks::UnitLocks;

// Observe a unit and render its panel.
async fn render_panel(
    db: &mut Connection<Units>,
    locks: &UnitLocks,
    drift: &Drift,
    id: Option<i64>,
    uri: &Origin<'_>,
) -> Result<Template, PanelError> {
    let observation = panel_error(unit::observe(db, locks, drift, id), uri).await?;
    Ok(Template::render(
        "panel",
        Panel::new(&observation, drift.is_enabled()),
    ))
}

// Apply an action to a unit and go back to its panel.
async fn act(
    db: &mut Connection<Units>,
    locks: &UnitLocks,
    id: Option<i64>,
    action: Action<'_>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    let unit = panel_error(unit::apply(db, locks, id, action), uri).await?;
    Ok(Redirect::to(uri!(unit_panel(unit.id))))
}

#[get("/")]
async fn panel(
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    drift: &State<Drift>,
    uri: &Origin<'_>,
) -> Result<Template, PanelError> {
    render_panel(&mut db, locks, drift, None, uri).await
}

#[get("/<id>")]
async fn unit_panel(
    id: i64,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    drift: &State<Drift>,
    uri: &Origin<'_>,
) -> Result<Template, PanelError> {
    render_panel(&mut db, locks, drift, Some(id), uri).await
}

#[post("/toggle")]
async fn toggle(
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    act(&mut db, locks, None, Action::TogglePower, uri).await
}

#[post("/<id>/toggle")]
async fn unit_toggle(
    id: i64,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    act(&mut db, locks, Some(id), Action::TogglePower, uri).await
}

#[post("/increase")]
async fn increase(
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    act(&mut db, locks, None, Action::IncreaseTemperature, uri).await
}

#[post("/<id>/increase")]
async fn unit_increase(
    id: i64,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    act(&mut db, locks, Some(id), Action::IncreaseTemperature, uri).await
}

#[post("/decrease")]
async fn decrease(
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    act(&mut db, locks, None, Action::DecreaseTemperature, uri).await
}

#[post("/<id>/decrease")]
async fn unit_decrease(
    id: i64,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    act(&mut db, locks, Some(id), Action::DecreaseTemperature, uri).await
}

#[post("/mode", data = "<input>")]
async fn mode(
    input: Form<ModeInput<'_>>,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    let action = Action::SetMode(input.mode.unwrap_or_default());
    act(&mut db, locks, None, action, uri).await
}

#[post("/<id>/mode", data = "<input>")]
async fn unit_mode(
    id: i64,
    input: Form<ModeInput<'_>>,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    let action = Action::SetMode(input.mode.unwrap_or_default());
    act(&mut db, locks, Some(id), action, uri).await
}

#[post("/fan", data = "<input>")]
async fn fan_speed(
    input: Form<FanSpeedInput<'_>>,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    let action = Action::SetFanSpeed(input.fan_speed.unwrap_or_default());
    act(&mut db, locks, None, action, uri).await
}

#[post("/<id>/fan", data = "<input>")]
async fn unit_fan_speed(
    id: i64,
    input: Form<FanSpeedInput<'_>>,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    uri: &Origin<'_>,
) -> Result<Redirect, PanelError> {
    let action = Action::SetFanSpeed(input.fan_speed.unwrap_or_default());
    act(&mut db, locks, Some(id), action, uri).await
}

// Return the stored units for possible third-parties applications.
#[get("/api/units")]
async fn units(
    mut db: Connection<Units>,
    uri: &Origin<'_>,
) -> Result<Json<Vec<ClimateUnit>>, PanelError> {
    let units = panel_error(unit::all_units(&mut db), uri).await?;
    Ok(Json(units))
}

// Return a unit observation for possible third-parties applications.
#[get("/api/units/<id>")]
async fn unit_observation(
    id: i64,
    mut db: Connection<Units>,
    locks: &State<UnitLocks>,
    drift: &State<Drift>,
    uri: &Origin<'_>,
) -> Result<Json<Observation>, PanelError> {
    let observation = panel_error(unit::observe(&mut db, locks, drift, Some(id)), uri).await?;
    Ok(Json(observation))
}

fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .mount(
            "/",
            routes![
                panel,
                unit_panel,
                toggle,
                unit_toggle,
                increase,
                unit_increase,
                decrease,
                unit_decrease,
                mode,
                unit_mode,
                fan_speed,
                unit_fan_speed,
                units,
                unit_observation
            ],
        )
        .manage(UnitLocks::default())
        .attach(config::stage())
        .attach(database::stage())
        .attach(Template::fairing())
        .register("/", error::catchers())
}

#[launch]
fn rocket() -> _ {
    // Enable tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            format!("{app_name}=info").into()
        }))
        .init();

    build(rocket::Config::figment())
}
