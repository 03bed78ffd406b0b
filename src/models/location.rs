//! Location and room models.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A clinic location where sessions take place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Unique location identifier.
    pub id: String,
    /// Display name; falls back to the id when blank in the input.
    pub name: String,
    /// Default start-of-day, used by session generation when a template
    /// carries no start time.
    pub default_start_time: Option<NaiveTime>,
    /// Default end-of-day, counterpart of `default_start_time`.
    pub default_end_time: Option<NaiveTime>,
}

/// A room within a location.
///
/// Rooms are metadata for session generation and display; the planner
/// itself treats a session's room as an opaque label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Parent location id.
    pub location_id: String,
    /// Room name, unique within the location.
    pub name: String,
}

impl Location {
    /// Creates a location with the given id (name defaults to the id).
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            default_start_time: None,
            default_end_time: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the default day window.
    pub fn with_default_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.default_start_time = Some(start);
        self.default_end_time = Some(end);
        self
    }
}

impl Room {
    /// Creates a room.
    pub fn new(
        id: impl Into<String>,
        location_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            location_id: location_id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_builder() {
        let start = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        let end = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let loc = Location::new("L1")
            .with_name("Kliniek Noord")
            .with_default_times(start, end);

        assert_eq!(loc.id, "L1");
        assert_eq!(loc.name, "Kliniek Noord");
        assert_eq!(loc.default_start_time, Some(start));
        assert_eq!(loc.default_end_time, Some(end));

        let bare = Location::new("L2");
        assert_eq!(bare.name, "L2");
        assert!(bare.default_start_time.is_none());
    }

    #[test]
    fn test_room() {
        let room = Room::new("R1", "L1", "Spreekkamer 1");
        assert_eq!(room.location_id, "L1");
        assert_eq!(room.name, "Spreekkamer 1");
    }
}
