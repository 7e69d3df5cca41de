pub mod config;
pub mod coords;
pub mod persistence;
pub mod storage;
pub mod tracker;
pub mod validation;
pub mod workout;

pub use config::TrackerConfig;
pub use coords::Coords;
pub use tracker::{TrackerError, WorkoutTracker};
pub use workout::{Workout, WorkoutId, WorkoutKind};
