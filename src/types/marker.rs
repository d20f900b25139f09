use serde::Deserialize;
use std::fmt;
use walkers::Position;

use super::Status;

/// One point on the map, as supplied by the startup data. Only `status`
/// and `note` ever change during a session, and only after the server
/// has confirmed the corresponding update.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarkerRecord {
    pub lat: f64,
    pub lon: f64,
    pub mapid: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub tooltip: serde_json::Map<String, serde_json::Value>,
}

impl MarkerRecord {
    pub fn position(&self) -> Position {
        Position::from_lat_lon(self.lat, self.lon)
    }

    pub fn key(&self) -> CoordKey {
        CoordKey::new(self.lat, self.lon)
    }

    /// The `latlon` string of the update payload. This is the plain
    /// `Display` form of both coordinates, not the 6-decimal lookup form.
    pub fn latlon(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// Coordinate identity key. Markers have no separate unique identifier,
/// so the coordinate pair (at fixed 6-decimal precision) identifies a
/// marker for the lifetime of a session. Two records whose coordinates
/// round to the same 6-digit value are indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordKey {
    lat: String,
    lon: String,
}

impl CoordKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: format!("{lat:.6}"),
            lon: format!("{lon:.6}"),
        }
    }
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}
