use rocket::fairing::AdHoc;

use serde::Deserialize;

use crate::drift::Drift;

// Configuration key of the panel settings.
const CONFIG_KEY: &str = "climate";

/// Panel settings, read from the `climate` table of the Rocket configuration.
///
/// ```toml
/// [default.climate]
/// drift = true
/// drift_seed = 7
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ClimateConfig {
    // Whether the target temperature drifts while a unit is on.
    pub(crate) drift: bool,
    // Seed of the drift random source. Entropy is used when absent.
    pub(crate) drift_seed: Option<u64>,
}

// Read the panel settings and manage the drift source built from them.
pub(crate) fn stage() -> AdHoc {
    AdHoc::try_on_ignite("Climate Config", |rocket| async move {
        let config = rocket.figment().focus(CONFIG_KEY).extract::<ClimateConfig>();
        match config {
            Ok(config) => {
                tracing::info!(
                    drift = config.drift,
                    seed = ?config.drift_seed,
                    "Drift simulation configured"
                );
                let drift = Drift::from_config(&config);
                Ok(rocket.manage(drift))
            }
            Err(e) => {
                tracing::error!("Invalid climate configuration: {}", e);
                Err(rocket)
            }
        }
    })
}
