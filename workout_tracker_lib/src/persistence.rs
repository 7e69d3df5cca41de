//! Whole-collection persistence into a single key-value slot.
//!
//! Every save overwrites the slot with the full collection as JSON. Loading
//! picks each record's variant from its `type` tag and recomputes the derived
//! metrics, so a rehydrated workout behaves exactly like a freshly created one.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    storage::{KeyValueStore, StorageError},
    workout::Workout,
};

/// Suffix of the slot that receives an unreadable collection.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize workouts: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Stored workouts are unreadable: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, key: &str, workouts: &[Workout]) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(workouts).map_err(PersistenceError::Serialize)?;
    store.set(key, &json)?;
    debug!(key, count = workouts.len(), bytes = json.len(), "Saved workouts");
    Ok(())
}

/// `Ok(None)` when nothing was ever saved, `Err` when the slot is corrupt.
pub fn try_load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Option<Vec<Workout>>, PersistenceError> {
    let Some(json) = store.get(key) else {
        return Ok(None);
    };

    let mut workouts: Vec<Workout> = serde_json::from_str(&json).map_err(PersistenceError::Deserialize)?;
    for workout in workouts.iter_mut() {
        workout.refresh_metrics();
    }

    Ok(Some(workouts))
}

/// Absent and corrupt slots both give an empty collection.
pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Vec<Workout> {
    match try_load(store, key) {
        Ok(workouts) => workouts.unwrap_or_default(),
        Err(err) => {
            warn!(key, "{err}");
            Vec::new()
        }
    }
}

/// Copies the raw contents of `key` to `<key>.corrupt`.
pub fn back_up_corrupt<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> Result<(), StorageError> {
    if let Some(raw) = store.get(key) {
        store.set(&format!("{key}{CORRUPT_SUFFIX}"), &raw)?;
    }
    Ok(())
}

pub fn clear<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> Result<(), StorageError> {
    store.remove(key)
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::{
        coords::Coords,
        storage::MemoryStore,
        workout::{WorkoutKind, WorkoutType},
    };

    const KEY: &str = "workouts";

    fn sample() -> Vec<Workout> {
        let date = Local.with_ymd_and_hms(2026, 6, 2, 7, 15, 0).unwrap();
        vec![
            Workout::running_at(date, Coords(38.72, -9.14), 5.2, 24., 178.),
            Workout::cycling_at(date + chrono::Duration::minutes(90), Coords(38.75, -9.2), 27., 95., -40.),
        ]
    }

    #[test]
    fn round_trip_keeps_kinds() {
        let mut store = MemoryStore::new();
        let workouts = sample();
        save(&mut store, KEY, &workouts).unwrap();

        let loaded = try_load(&store, KEY).unwrap().unwrap();
        assert_eq!(loaded, workouts);
        assert_eq!(loaded[0].workout_type(), WorkoutType::Running);
        assert_eq!(loaded[1].workout_type(), WorkoutType::Cycling);
    }

    #[test]
    fn save_overwrites() {
        let mut store = MemoryStore::new();
        let workouts = sample();
        save(&mut store, KEY, &workouts).unwrap();
        save(&mut store, KEY, &workouts[..1]).unwrap();

        assert_eq!(load(&store, KEY).len(), 1);
    }

    #[test]
    fn absent_slot_is_empty() {
        let store = MemoryStore::new();
        assert!(try_load(&store, KEY).unwrap().is_none());
        assert!(load(&store, KEY).is_empty());
    }

    #[test]
    fn corrupt_slot_is_empty() {
        let mut store = MemoryStore::new();
        store.set(KEY, "{not json").unwrap();
        assert!(matches!(try_load(&store, KEY), Err(PersistenceError::Deserialize(_))));
        assert!(load(&store, KEY).is_empty());

        store.set(KEY, r#"[{"type":"swimming"}]"#).unwrap();
        assert!(load(&store, KEY).is_empty());
    }

    #[test]
    fn rehydration_recomputes_stale_metrics() {
        let mut store = MemoryStore::new();
        let mut value = serde_json::to_value(sample()).unwrap();
        value[0]["pace"] = serde_json::json!(99.0);
        store.set(KEY, &value.to_string()).unwrap();

        let loaded = load(&store, KEY);
        let WorkoutKind::Running { pace, .. } = *loaded[0].kind() else {
            panic!("expected running");
        };
        assert!((pace - 24. / 5.2).abs() < 1e-9);
    }

    #[test]
    fn backup_and_clear() {
        let mut store = MemoryStore::new();
        store.set(KEY, "garbage").unwrap();
        back_up_corrupt(&mut store, KEY).unwrap();
        clear(&mut store, KEY).unwrap();

        assert!(store.get(KEY).is_none());
        assert_eq!(store.get("workouts.corrupt").as_deref(), Some("garbage"));
    }
}
