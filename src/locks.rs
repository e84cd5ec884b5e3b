use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rocket::tokio::sync::{Mutex as AsyncMutex, MutexGuard, OwnedMutexGuard};

/// Serializes read-modify-write cycles on climate units.
///
/// One lock exists per unit identifier, created on first use. A separate
/// lock guards the creation of the default unit.
#[derive(Default)]
pub(crate) struct UnitLocks {
    units: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
    creation: AsyncMutex<()>,
}

impl UnitLocks {
    pub(crate) async fn lock(&self, id: i64) -> OwnedMutexGuard<()> {
        let unit = self
            .units
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .clone();
        unit.lock_owned().await
    }

    pub(crate) async fn lock_creation(&self) -> MutexGuard<'_, ()> {
        self.creation.lock().await
    }
}
