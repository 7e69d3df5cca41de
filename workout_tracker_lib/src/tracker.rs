use std::{fmt, str::FromStr};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    config::TrackerConfig,
    coords::{bounding_box, Coords},
    persistence::{self, PersistenceError},
    storage::{KeyValueStore, StorageError},
    validation::{validate_field, ValidationError, WorkoutForm},
    workout::{Field, FieldMismatch, Workout, WorkoutId},
};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No workout with id {0}")]
    NotFound(WorkoutId),
    #[error(transparent)]
    FieldMismatch(#[from] FieldMismatch),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<StorageError> for TrackerError {
    fn from(err: StorageError) -> Self {
        TrackerError::Persistence(PersistenceError::Storage(err))
    }
}

/// Orderings offered by the workout list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first
    #[default]
    Date,
    /// Longest first
    Distance,
    /// Longest first
    Duration,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Date, SortKey::Distance, SortKey::Duration];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Distance => "distance",
            SortKey::Duration => "duration",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.label() == s)
            .ok_or_else(|| format!("Unknown sort key: {s}"))
    }
}

/// The authoritative workout collection.
///
/// Every mutation goes through this type and writes the full collection back
/// to the store before returning, so the in-memory list and the persisted copy
/// never diverge. If the write fails the in-memory change is kept and the
/// error is returned.
pub struct WorkoutTracker<S: KeyValueStore> {
    store: S,
    config: TrackerConfig,
    workouts: Vec<Workout>,
}

impl<S: KeyValueStore> WorkoutTracker<S> {
    /// Rehydrates the collection from `store`. A corrupt slot is backed up
    /// and the tracker starts empty.
    pub fn open(mut store: S, config: TrackerConfig) -> Self {
        let key = config.storage_key.as_str();
        let workouts = match persistence::try_load(&store, key) {
            Ok(Some(workouts)) => workouts,
            Ok(None) => {
                info!(key, "No saved workouts");
                Vec::new()
            }
            Err(err) => {
                warn!(key, "Discarding saved workouts: {err}");
                if let Err(err) = persistence::back_up_corrupt(&mut store, key) {
                    error!(key, "Failed to back up unreadable workouts: {err}");
                }
                Vec::new()
            }
        };

        info!(count = workouts.len(), "Loaded workouts");

        Self { store, config, workouts }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Workouts in insertion order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn sorted(&self, key: SortKey) -> Vec<&Workout> {
        let mut sorted: Vec<&Workout> = self.workouts.iter().collect();
        match key {
            // Insertion order is creation order
            SortKey::Date => sorted.reverse(),
            SortKey::Distance => sorted.sort_by(|a, b| b.distance().total_cmp(&a.distance())),
            SortKey::Duration => sorted.sort_by(|a, b| b.duration().total_cmp(&a.duration())),
        }
        sorted
    }

    /// South-west and north-east corners around every workout.
    pub fn bounds(&self) -> Option<(Coords, Coords)> {
        let coords: Vec<Coords> = self.workouts.iter().map(Workout::coords).collect();
        bounding_box(&coords)
    }

    pub fn submit(&mut self, coords: Coords, form: &WorkoutForm) -> Result<&Workout, TrackerError> {
        self.submit_at(Local::now(), coords, form)
    }

    pub fn submit_at(&mut self, date: DateTime<Local>, coords: Coords, form: &WorkoutForm) -> Result<&Workout, TrackerError> {
        let valid = form.validate()?;
        let mut workout = valid.into_workout(date, coords);

        let mut millis = date.timestamp_millis();
        while self.find(workout.id()).is_some() {
            millis += 1;
            workout.reassign_id(WorkoutId::from_millis(millis));
        }

        info!(id = %workout.id(), kind = %workout.workout_type(), "New workout: {}", workout.description());
        self.workouts.push(workout);
        self.persist()?;

        Ok(&self.workouts[self.workouts.len() - 1])
    }

    /// Sets one numeric field from raw input, validated like the form.
    pub fn edit(&mut self, id: &WorkoutId, field: Field, raw: &str) -> Result<&Workout, TrackerError> {
        let index = self.index_of(id)?;
        let value = validate_field(field, raw)?;
        self.workouts[index].set_field(field, value)?;

        debug!(%id, %field, value, "Edited workout");
        self.persist()?;

        Ok(&self.workouts[index])
    }

    /// Removes a workout. An unknown id is a no-op and returns `None`.
    pub fn delete(&mut self, id: &WorkoutId) -> Result<Option<Workout>, TrackerError> {
        let Ok(index) = self.index_of(id) else {
            debug!(%id, "Nothing to delete");
            return Ok(None);
        };

        let removed = self.workouts.remove(index);
        info!(%id, "Deleted workout");
        self.persist()?;

        Ok(Some(removed))
    }

    /// Removes every workout and the storage slot. Returns how many were removed.
    pub fn reset(&mut self) -> Result<usize, TrackerError> {
        let count = self.workouts.len();
        self.workouts.clear();
        persistence::clear(&mut self.store, &self.config.storage_key)?;

        info!(count, "Reset workouts");
        Ok(count)
    }

    /// Counts an interaction (list or marker click) with a workout.
    pub fn click(&mut self, id: &WorkoutId) -> Result<&Workout, TrackerError> {
        let index = self.index_of(id)?;
        self.workouts[index].click();
        self.persist()?;

        Ok(&self.workouts[index])
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn index_of(&self, id: &WorkoutId) -> Result<usize, TrackerError> {
        self.workouts
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))
    }

    fn persist(&mut self) -> Result<(), PersistenceError> {
        persistence::save(&mut self.store, &self.config.storage_key, &self.workouts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        storage::MemoryStore,
        workout::{WorkoutKind, WorkoutType},
    };

    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("QuotaExceededError".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn date(minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 5, 9, 18, minute, 0).unwrap()
    }

    fn running(distance: &str, duration: &str, cadence: &str) -> WorkoutForm {
        WorkoutForm {
            distance: distance.into(),
            duration: duration.into(),
            cadence: cadence.into(),
            ..WorkoutForm::new(WorkoutType::Running)
        }
    }

    fn cycling(distance: &str, duration: &str, elevation: &str) -> WorkoutForm {
        WorkoutForm {
            distance: distance.into(),
            duration: duration.into(),
            elevation: elevation.into(),
            ..WorkoutForm::new(WorkoutType::Cycling)
        }
    }

    fn tracker() -> WorkoutTracker<MemoryStore> {
        WorkoutTracker::open(MemoryStore::new(), TrackerConfig::default())
    }

    #[test]
    fn submit_persists_collection() {
        let mut tracker = tracker();
        let id = tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap().id().clone();

        assert_eq!(tracker.len(), 1);
        let saved = persistence::load(tracker.store(), "workouts");
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id(), &id);
    }

    #[test]
    fn rejected_submit_changes_nothing() {
        let mut tracker = tracker();
        let err = tracker.submit_at(date(0), Coords(1., 2.), &running("0", "25", "180")).unwrap_err();

        assert!(matches!(err, TrackerError::Validation(ValidationError::NotPositive(Field::Distance))));
        assert!(tracker.is_empty());
        assert!(tracker.store().get("workouts").is_none());
    }

    #[test]
    fn same_millisecond_gets_distinct_ids() {
        let mut tracker = tracker();
        let first = tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap().id().clone();
        let second = tracker.submit_at(date(0), Coords(1., 2.), &cycling("20", "60", "0")).unwrap().id().clone();

        assert_ne!(first, second);
        assert_eq!(
            second,
            WorkoutId::from_millis(date(0).timestamp_millis() + 1)
        );
    }

    #[test]
    fn edit_updates_memory_and_store() {
        let mut tracker = tracker();
        let id = tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap().id().clone();

        let edited = tracker.edit(&id, Field::Duration, "30").unwrap();
        assert_eq!(edited.kind(), &WorkoutKind::Running { cadence: 180., pace: 6. });

        let saved = persistence::load(tracker.store(), "workouts");
        assert_eq!(saved[0].duration(), 30.);
        assert_eq!(saved[0].kind(), &WorkoutKind::Running { cadence: 180., pace: 6. });
    }

    #[test]
    fn edit_errors() {
        let mut tracker = tracker();
        let id = tracker.submit_at(date(0), Coords(1., 2.), &cycling("20", "60", "5")).unwrap().id().clone();

        assert!(matches!(
            tracker.edit(&id, Field::Cadence, "170"),
            Err(TrackerError::FieldMismatch(_))
        ));
        assert!(matches!(
            tracker.edit(&id, Field::Distance, "-3"),
            Err(TrackerError::Validation(ValidationError::NotPositive(Field::Distance)))
        ));
        assert!(matches!(
            tracker.edit(&WorkoutId::from("missing"), Field::Distance, "3"),
            Err(TrackerError::NotFound(_))
        ));
        assert_eq!(tracker.workouts()[0].distance(), 20.);
    }

    #[test]
    fn rejected_edit_keeps_stored_values() {
        let mut tracker = tracker();
        let id = tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap().id().clone();

        for raw in ["0", "abc", ""] {
            assert!(matches!(
                tracker.edit(&id, Field::Distance, raw),
                Err(TrackerError::Validation(_))
            ));
        }

        let workout = tracker.find(&id).unwrap();
        assert_eq!(workout.distance(), 5.);
        assert_eq!(workout.kind(), &WorkoutKind::Running { cadence: 180., pace: 5. });

        let saved = persistence::load(tracker.store(), "workouts");
        assert_eq!(saved[0].distance(), 5.);
        assert_eq!(saved[0].kind(), &WorkoutKind::Running { cadence: 180., pace: 5. });
    }

    #[test]
    fn delete_and_missing_delete() {
        let mut tracker = tracker();
        let first = tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap().id().clone();
        tracker.submit_at(date(1), Coords(1., 2.), &running("10", "50", "170")).unwrap();

        let removed = tracker.delete(&first).unwrap().unwrap();
        assert_eq!(removed.id(), &first);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.find(&first).is_none());
        assert_eq!(persistence::load(tracker.store(), "workouts").len(), 1);

        assert!(tracker.delete(&first).unwrap().is_none());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn reset_removes_slot() {
        let mut tracker = tracker();
        tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap();
        tracker.submit_at(date(1), Coords(1., 2.), &cycling("20", "60", "5")).unwrap();

        assert_eq!(tracker.reset().unwrap(), 2);
        assert!(tracker.is_empty());
        assert!(tracker.store().get("workouts").is_none());
    }

    #[test]
    fn click_counts_interactions() {
        let mut tracker = tracker();
        let id = tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap().id().clone();
        tracker.click(&id).unwrap();
        tracker.click(&id).unwrap();

        assert_eq!(tracker.find(&id).unwrap().clicks(), 2);
        assert_eq!(persistence::load(tracker.store(), "workouts")[0].clicks(), 2);
    }

    #[test]
    fn sorting() {
        let mut tracker = tracker();
        tracker.submit_at(date(0), Coords(1., 2.), &running("5", "40", "180")).unwrap();
        tracker.submit_at(date(1), Coords(1., 2.), &cycling("20", "60", "5")).unwrap();
        tracker.submit_at(date(2), Coords(1., 2.), &running("10", "50", "170")).unwrap();

        let distances = |key| tracker.sorted(key).iter().map(|w| w.distance()).collect::<Vec<_>>();
        assert_eq!(distances(SortKey::Date), vec![10., 20., 5.]);
        assert_eq!(distances(SortKey::Distance), vec![20., 10., 5.]);
        assert_eq!(distances(SortKey::Duration), vec![20., 10., 5.]);
    }

    #[test]
    fn sort_key_labels() {
        for key in SortKey::ALL {
            assert_eq!(key.label().parse::<SortKey>().unwrap(), key);
        }
        assert!("pace".parse::<SortKey>().is_err());
    }

    #[test]
    fn bounds_cover_all_workouts() {
        let mut tracker = tracker();
        assert!(tracker.bounds().is_none());

        tracker.submit_at(date(0), Coords(38.7, -9.1), &running("5", "25", "180")).unwrap();
        tracker.submit_at(date(1), Coords(41.1, -8.6), &cycling("20", "60", "5")).unwrap();
        assert_eq!(tracker.bounds(), Some((Coords(38.7, -9.1), Coords(41.1, -8.6))));
    }

    #[test]
    fn failed_write_keeps_workout_in_memory() {
        let mut tracker = WorkoutTracker::open(FullStore, TrackerConfig::default());
        let err = tracker.submit_at(date(0), Coords(1., 2.), &running("5", "25", "180")).unwrap_err();

        assert!(matches!(err, TrackerError::Persistence(PersistenceError::Storage(StorageError::Write(_)))));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn corrupt_slot_is_backed_up() {
        let mut store = MemoryStore::new();
        store.set("workouts", "[{\"type\":").unwrap();

        let tracker = WorkoutTracker::open(store, TrackerConfig::default());
        assert!(tracker.is_empty());
        assert_eq!(tracker.store().get("workouts.corrupt").as_deref(), Some("[{\"type\":"));
    }
}
