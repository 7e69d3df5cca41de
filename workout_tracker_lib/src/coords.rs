use serde::{Deserialize, Serialize};

/// Latitude/longitude pair. Serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords(pub f64, pub f64);

impl Coords {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(latitude, longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// Smallest box containing a set of coordinates, as (south-west, north-east).
pub fn bounding_box<'a>(coords: impl IntoIterator<Item = &'a Coords>) -> Option<(Coords, Coords)> {
    let mut iter = coords.into_iter();
    let first = *iter.next()?;

    let (mut south_west, mut north_east) = (first, first);
    for c in iter {
        south_west.0 = south_west.0.min(c.0);
        south_west.1 = south_west.1.min(c.1);
        north_east.0 = north_east.0.max(c.0);
        north_east.1 = north_east.1.max(c.1);
    }

    Some((south_west, north_east))
}
