use crate::types::{CoordKey, MarkerRecord};

/// Tracks which marker, if any, currently has its popup open.
pub struct SelectionState {
    pub marker: Option<CoordKey>,
}

impl SelectionState {
    pub fn new() -> SelectionState {
        Self { marker: None }
    }

    /// If the provided marker is already selected, it will be deselected.
    /// Otherwise, it will be selected.
    pub fn toggle_marker_selection(&mut self, record: &MarkerRecord) {
        let key = record.key();
        if self.marker.as_ref() == Some(&key) {
            self.marker = None;
        } else {
            self.marker = Some(key);
        }
    }

    pub fn is_selected(&self, record: &MarkerRecord) -> bool {
        self.marker.as_ref() == Some(&record.key())
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// The marker collection shown on the map. Records are loaded once at
/// startup and never added or removed; only `status` and `note` mutate.
pub struct ViewState {
    pub markers: Vec<MarkerRecord>,
}

impl ViewState {
    pub fn new(markers: Vec<MarkerRecord>) -> Self {
        Self { markers }
    }

    /// Resolves a coordinate pair back to its record, comparing both
    /// coordinates at 6-decimal precision. Linear scan; marker counts
    /// are small. Returns `None` on a miss.
    pub fn find_by_coord(&mut self, lat: f64, lon: f64) -> Option<&mut MarkerRecord> {
        let key = CoordKey::new(lat, lon);
        self.markers.iter_mut().find(|record| record.key() == key)
    }

    pub fn find_by_key(&self, key: &CoordKey) -> Option<&MarkerRecord> {
        self.markers.iter().find(|record| record.key() == *key)
    }
}
