//! Form input coercion and validation.
//!
//! Raw strings are coerced the way a browser coerces a numeric input: the
//! value is trimmed, an empty field counts as zero and anything unparsable
//! becomes NaN. Validation then decides which fields must be finite and which
//! must also be strictly positive.

use thiserror::Error;

use crate::{
    coords::Coords,
    workout::{Field, Workout, WorkoutType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Inputs have to be numbers ({0} is not)")]
    NotANumber(Field),
    #[error("Inputs have to be positive numbers ({0} is not)")]
    NotPositive(Field),
}

/// Raw values as typed into the workout form.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutForm {
    pub workout_type: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl WorkoutForm {
    pub fn new(workout_type: WorkoutType) -> Self {
        Self {
            workout_type,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
        }
    }

    pub fn validate(&self) -> Result<ValidWorkout, ValidationError> {
        let distance = positive(Field::Distance, &self.distance)?;
        let duration = positive(Field::Duration, &self.duration)?;

        match self.workout_type {
            WorkoutType::Running => Ok(ValidWorkout::Running {
                distance,
                duration,
                cadence: positive(Field::Cadence, &self.cadence)?,
            }),
            WorkoutType::Cycling => Ok(ValidWorkout::Cycling {
                distance,
                duration,
                elevation_gain: finite(Field::ElevationGain, &self.elevation)?,
            }),
        }
    }
}

/// Checked form values, ready to become a [`Workout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidWorkout {
    Running { distance: f64, duration: f64, cadence: f64 },
    Cycling { distance: f64, duration: f64, elevation_gain: f64 },
}

impl ValidWorkout {
    pub fn into_workout(self, date: chrono::DateTime<chrono::Local>, coords: Coords) -> Workout {
        match self {
            ValidWorkout::Running { distance, duration, cadence } => {
                Workout::running_at(date, coords, distance, duration, cadence)
            }
            ValidWorkout::Cycling { distance, duration, elevation_gain } => {
                Workout::cycling_at(date, coords, distance, duration, elevation_gain)
            }
        }
    }
}

/// Browser-style numeric coercion: blank is zero, garbage is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Validates a single edited field with the same rules as the form.
pub fn validate_field(field: Field, raw: &str) -> Result<f64, ValidationError> {
    match field {
        Field::ElevationGain => finite(field, raw),
        Field::Distance | Field::Duration | Field::Cadence => positive(field, raw),
    }
}

fn finite(field: Field, raw: &str) -> Result<f64, ValidationError> {
    let value = coerce_number(raw);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotANumber(field))
    }
}

fn positive(field: Field, raw: &str) -> Result<f64, ValidationError> {
    let value = finite(field, raw)?;
    if value > 0. {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(workout_type: WorkoutType, distance: &str, duration: &str, extra: &str) -> WorkoutForm {
        let mut form = WorkoutForm::new(workout_type);
        form.distance = distance.into();
        form.duration = duration.into();
        match workout_type {
            WorkoutType::Running => form.cadence = extra.into(),
            WorkoutType::Cycling => form.elevation = extra.into(),
        }
        form
    }

    #[test]
    fn coercion() {
        assert_eq!(coerce_number(" 5.5 "), 5.5);
        assert_eq!(coerce_number(""), 0.);
        assert_eq!(coerce_number("   "), 0.);
        assert_eq!(coerce_number("1e2"), 100.);
        assert!(coerce_number("five").is_nan());
        assert!(coerce_number("inf").is_infinite());
    }

    #[test]
    fn accepts_valid_running() {
        let valid = form(WorkoutType::Running, "5", "25", "180").validate().unwrap();
        assert_eq!(valid, ValidWorkout::Running { distance: 5., duration: 25., cadence: 180. });
    }

    #[test]
    fn rejects_running_without_positive_cadence() {
        assert_eq!(
            form(WorkoutType::Running, "5", "25", "0").validate(),
            Err(ValidationError::NotPositive(Field::Cadence))
        );
        assert_eq!(
            form(WorkoutType::Running, "5", "25", "-170").validate(),
            Err(ValidationError::NotPositive(Field::Cadence))
        );
    }

    #[test]
    fn rejects_non_numbers_and_non_positive_distance() {
        assert_eq!(
            form(WorkoutType::Running, "abc", "25", "180").validate(),
            Err(ValidationError::NotANumber(Field::Distance))
        );
        assert_eq!(
            form(WorkoutType::Cycling, "0", "60", "10").validate(),
            Err(ValidationError::NotPositive(Field::Distance))
        );
        assert_eq!(
            form(WorkoutType::Cycling, "20", "NaN", "10").validate(),
            Err(ValidationError::NotANumber(Field::Duration))
        );
        assert_eq!(
            form(WorkoutType::Cycling, "20", "infinity", "10").validate(),
            Err(ValidationError::NotANumber(Field::Duration))
        );
    }

    #[test]
    fn cycling_elevation_only_needs_to_be_finite() {
        for elevation in ["-5", "0", "", "1200"] {
            assert!(form(WorkoutType::Cycling, "20", "60", elevation).validate().is_ok(), "{elevation}");
        }
        assert_eq!(
            form(WorkoutType::Cycling, "20", "60", "uphill").validate(),
            Err(ValidationError::NotANumber(Field::ElevationGain))
        );
    }

    #[test]
    fn unused_field_is_ignored() {
        let mut running = form(WorkoutType::Running, "5", "25", "180");
        running.elevation = "garbage".into();
        assert!(running.validate().is_ok());
    }

    #[test]
    fn edited_fields() {
        assert_eq!(validate_field(Field::Distance, "7"), Ok(7.));
        assert_eq!(validate_field(Field::Duration, "0"), Err(ValidationError::NotPositive(Field::Duration)));
        assert_eq!(validate_field(Field::ElevationGain, "-30"), Ok(-30.));
        assert_eq!(validate_field(Field::Cadence, "x"), Err(ValidationError::NotANumber(Field::Cadence)));
    }
}
