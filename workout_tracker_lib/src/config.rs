use crate::coords::Coords;

pub const DEFAULT_STORAGE_KEY: &str = "workouts";
pub const DEFAULT_MAP_ZOOM: f64 = 14.;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Settings shared by the tracker and the map.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Storage slot holding the serialized workouts
    pub storage_key: String,
    pub map_zoom: f64,
    pub tile_url: String,
    pub tile_attribution: String,
    /// Where the map starts before (or without) a geolocation fix
    pub default_center: Coords,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            map_zoom: DEFAULT_MAP_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_owned(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_owned(),
            default_center: Coords(51.505, -0.09),
        }
    }
}

impl TrackerConfig {
    /// Default config with the tile URL taken from `WORKOUT_TRACKER_TILE_URL`
    /// at compile time, if set.
    pub fn from_build_env() -> Self {
        Self::default().with_tile_url(option_env!("WORKOUT_TRACKER_TILE_URL"))
    }

    pub fn with_tile_url(mut self, tile_url: Option<&str>) -> Self {
        if let Some(url) = tile_url.map(str::trim).filter(|url| !url.is_empty()) {
            self.tile_url = url.to_owned();
        }
        self
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }
}
