use serde::{Deserialize, Serialize};

use crate::entities::{movie, schedule};

pub const DEFAULT_AUDITORIUM: i8 = 1;

/// Surrogate key shared by every entity kind. Zero marks an instance the
/// store has not assigned a key to yet.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i32);

impl RecordId {
    pub const UNSAVED: RecordId = RecordId(0);

    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn is_saved(self) -> bool {
        self.0 != 0
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default)]
    pub id: RecordId,
    pub title: String,
    pub duration: i16,
    pub year: i16,
}

impl Movie {
    pub fn new(title: impl Into<String>, duration: i16, year: i16) -> Self {
        Self { id: RecordId::UNSAVED, title: title.into(), duration, year }
    }
}

impl From<movie::Model> for Movie {
    fn from(row: movie::Model) -> Self {
        Self { id: RecordId(row.id), title: row.title, duration: row.duration, year: row.year }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub id: RecordId,
    /// Accepted on input, never written out.
    #[serde(skip_serializing)]
    pub movie_id: i32,
    pub date_and_time: String,
    #[serde(default = "default_auditorium")]
    pub auditorium: i8,
}

fn default_auditorium() -> i8 {
    DEFAULT_AUDITORIUM
}

impl Schedule {
    pub fn new(movie_id: i32, date_and_time: impl Into<String>, auditorium: i8) -> Self {
        Self { id: RecordId::UNSAVED, movie_id, date_and_time: date_and_time.into(), auditorium }
    }
}

impl From<schedule::Model> for Schedule {
    fn from(row: schedule::Model) -> Self {
        Self {
            id: RecordId(row.id),
            movie_id: row.movie_id,
            date_and_time: row.date_and_time,
            auditorium: row.auditorium,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_id_decodes_as_unsaved() {
        let movie: Movie =
            serde_json::from_value(json!({ "title": "Solaris", "duration": 167, "year": 1972 }))
                .unwrap();
        assert_eq!(movie.id, RecordId::UNSAVED);
        assert!(!movie.id.is_saved());
    }

    #[test]
    fn schedule_uses_camel_case_and_default_auditorium() {
        let schedule: Schedule = serde_json::from_value(json!({
            "id": 4,
            "movieId": 2,
            "dateAndTime": "2020-05-01 19:30"
        }))
        .unwrap();
        assert_eq!(schedule.id.get(), 4);
        assert_eq!(schedule.movie_id, 2);
        assert_eq!(schedule.auditorium, DEFAULT_AUDITORIUM);

        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value["dateAndTime"], "2020-05-01 19:30");
        assert_eq!(value["id"], 4);
        assert!(value.get("movieId").is_none());
    }

    #[test]
    fn schedule_requires_movie_id() {
        let decoded = serde_json::from_value::<Schedule>(json!({ "dateAndTime": "x" }));
        assert!(decoded.is_err());
    }
}
