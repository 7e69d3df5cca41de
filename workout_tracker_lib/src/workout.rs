use std::{fmt, str::FromStr};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coords::Coords;

/// Number of trailing timestamp digits kept in an id.
const ID_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Last ten digits of a millisecond timestamp.
    pub fn from_millis(millis: i64) -> Self {
        let digits = millis.to_string();
        let start = digits.len().saturating_sub(ID_DIGITS);
        Self(digits[start..].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    /// Lowercase tag, used for the persisted `type` and for CSS classes.
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            WorkoutType::Running => "🏃‍♂️",
            WorkoutType::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(WorkoutType::Running),
            "cycling" => Ok(WorkoutType::Cycling),
            other => Err(format!("Unknown workout type: {other}")),
        }
    }
}

/// Kind-specific data. The persisted `type` tag picks the variant on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    Running {
        /// steps/min
        cadence: f64,
        /// min/km
        pace: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        /// meters, may be negative
        elevation_gain: f64,
        /// km/h
        speed: f64,
    },
}

impl WorkoutKind {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// Numeric fields that can be edited after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    ElevationGain,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Distance => "distance",
            Field::Duration => "duration",
            Field::Cadence => "cadence",
            Field::ElevationGain => "elevation",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} does not apply to {kind} workouts")]
pub struct FieldMismatch {
    pub field: Field,
    pub kind: WorkoutType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: WorkoutId,
    date: DateTime<Local>,
    coords: Coords,
    /// km
    distance: f64,
    /// min
    duration: f64,
    description: String,
    #[serde(default)]
    clicks: u32,
    #[serde(flatten)]
    kind: WorkoutKind,
}

impl Workout {
    pub fn running(coords: Coords, distance: f64, duration: f64, cadence: f64) -> Self {
        Self::running_at(Local::now(), coords, distance, duration, cadence)
    }

    pub fn cycling(coords: Coords, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self::cycling_at(Local::now(), coords, distance, duration, elevation_gain)
    }

    pub fn running_at(date: DateTime<Local>, coords: Coords, distance: f64, duration: f64, cadence: f64) -> Self {
        let kind = WorkoutKind::Running { cadence, pace: pace(distance, duration) };
        Self::new(date, coords, distance, duration, kind)
    }

    pub fn cycling_at(date: DateTime<Local>, coords: Coords, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        let kind = WorkoutKind::Cycling { elevation_gain, speed: speed(distance, duration) };
        Self::new(date, coords, distance, duration, kind)
    }

    fn new(date: DateTime<Local>, coords: Coords, distance: f64, duration: f64, kind: WorkoutKind) -> Self {
        Self {
            id: WorkoutId::from_millis(date.timestamp_millis()),
            description: describe(kind.workout_type(), &date),
            date,
            coords,
            distance,
            duration,
            clicks: 0,
            kind,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub(crate) fn reassign_id(&mut self, id: WorkoutId) {
        self.id = id;
    }

    pub fn date(&self) -> DateTime<Local> {
        self.date
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    pub fn click(&mut self) {
        self.clicks += 1;
    }

    /// Recomputes pace or speed from the current distance and duration.
    pub fn refresh_metrics(&mut self) {
        match &mut self.kind {
            WorkoutKind::Running { pace: p, .. } => *p = pace(self.distance, self.duration),
            WorkoutKind::Cycling { speed: s, .. } => *s = speed(self.distance, self.duration),
        }
    }

    /// Sets one editable field and keeps the derived metric in sync.
    /// The value is not validated here.
    pub fn set_field(&mut self, field: Field, value: f64) -> Result<(), FieldMismatch> {
        match (field, &mut self.kind) {
            (Field::Distance, _) => self.distance = value,
            (Field::Duration, _) => self.duration = value,
            (Field::Cadence, WorkoutKind::Running { cadence, .. }) => *cadence = value,
            (Field::ElevationGain, WorkoutKind::Cycling { elevation_gain, .. }) => *elevation_gain = value,
            (field, kind) => {
                return Err(FieldMismatch { field, kind: kind.workout_type() });
            }
        }

        self.refresh_metrics();
        Ok(())
    }
}

fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.)
}

fn describe(workout_type: WorkoutType, date: &DateTime<Local>) -> String {
    format!("{} on {}", workout_type.title(), date.format("%B %-d"))
}
