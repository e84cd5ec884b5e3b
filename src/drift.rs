use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ClimateConfig;

/// Random source of the ambient drift simulation.
///
/// Each sample is a temperature step in `{-1, 0, 1}`. A disabled drift never
/// produces a step.
pub(crate) struct Drift(Option<Mutex<StdRng>>);

impl Drift {
    pub(crate) fn disabled() -> Self {
        Self(None)
    }

    pub(crate) fn seeded(seed: u64) -> Self {
        Self(Some(Mutex::new(StdRng::seed_from_u64(seed))))
    }

    pub(crate) fn from_entropy() -> Self {
        Self(Some(Mutex::new(StdRng::from_entropy())))
    }

    pub(crate) fn from_config(config: &ClimateConfig) -> Self {
        match (config.drift, config.drift_seed) {
            (false, _) => Self::disabled(),
            (true, Some(seed)) => Self::seeded(seed),
            (true, None) => Self::from_entropy(),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    // Draw the next temperature step.
    pub(crate) fn sample(&self) -> Option<i64> {
        self.0.as_ref().map(|rng| {
            rng.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(-1..=1)
        })
    }
}
