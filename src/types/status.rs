use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker status. Anything the server hands us that is not a known
/// status falls back to `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
    // serde requires the catch-all variant to be the last one.
    #[default]
    #[serde(other)]
    Default,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Default, Status::Active, Status::Inactive];

    /// Color used to paint the marker on the map.
    pub fn color(&self) -> Color32 {
        match self {
            Status::Active => Color32::GREEN,
            Status::Inactive => Color32::RED,
            Status::Default => Color32::BLUE,
        }
    }

    /// Wire form, as the server expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Default => "default",
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    /// Capitalized form shown in the dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Default => "Default",
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
