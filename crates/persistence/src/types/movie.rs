//! The catalog record and its create/update inputs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovieType {
    /// A feature film. Requires a duration.
    #[serde(rename = "Movie")]
    Movie,
    /// A television show.
    #[serde(rename = "TV Show")]
    TvShow,
}

impl MovieType {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieType::Movie => "Movie",
            MovieType::TvShow => "TV Show",
        }
    }
}

impl fmt::Display for MovieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Movie" => Ok(MovieType::Movie),
            "TV Show" => Ok(MovieType::TvShow),
            other => Err(format!("unknown movie type: {}", other)),
        }
    }
}

/// A stored catalog entry.
///
/// `id`, `created_at` and `updated_at` are assigned by whichever backend
/// created the record. Mirrored copies keep the primary's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Positive id, unique within the backend that minted it.
    pub id: i64,
    /// 1 to 255 characters.
    pub title: String,
    /// Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: MovieType,
    /// 1 to 255 characters.
    pub director: String,
    /// Positive, two decimal places when stored relationally.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub budget: Option<Decimal>,
    /// Up to 500 characters.
    pub location: Option<String>,
    /// Minutes. Present for every [`MovieType::Movie`].
    pub duration: Option<i32>,
    /// Release year.
    pub year: i32,
    /// Up to 1000 characters.
    pub additional_details: Option<String>,
    /// Assigned on creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Builds a freshly created record with both timestamps set to `now`.
    pub fn from_new(id: i64, input: NewMovie, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            kind: input.kind,
            director: input.director,
            budget: input.budget,
            location: input.location,
            duration: input.duration,
            year: input.year,
            additional_details: input.additional_details,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the provided fields of `update` and refreshes `updated_at`.
    pub fn apply(&mut self, update: &MovieUpdate, now: DateTime<Utc>) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(director) = &update.director {
            self.director = director.clone();
        }
        if let Some(budget) = update.budget {
            self.budget = budget;
        }
        if let Some(location) = &update.location {
            self.location = location.clone();
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(details) = &update.additional_details {
            self.additional_details = details.clone();
        }
        self.updated_at = now;
    }
}

/// Validated input for creating a record. Fields mirror [`Movie`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub kind: MovieType,
    pub director: String,
    pub budget: Option<Decimal>,
    pub location: Option<String>,
    pub duration: Option<i32>,
    pub year: i32,
    pub additional_details: Option<String>,
}

/// Validated partial input for updating a record.
///
/// The outer `Option` means "provided"; for nullable columns the inner
/// `Option` distinguishes an explicit `null` (clear the value) from a value.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub kind: Option<MovieType>,
    pub director: Option<String>,
    pub budget: Option<Option<Decimal>>,
    pub location: Option<Option<String>>,
    pub duration: Option<Option<i32>>,
    pub year: Option<i32>,
    pub additional_details: Option<Option<String>>,
}

impl MovieUpdate {
    /// Returns true if no field was provided.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.kind.is_none()
            && self.director.is_none()
            && self.budget.is_none()
            && self.location.is_none()
            && self.duration.is_none()
            && self.year.is_none()
            && self.additional_details.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NewMovie {
        NewMovie {
            title: "Inception".to_string(),
            kind: MovieType::Movie,
            director: "Nolan".to_string(),
            budget: Some(Decimal::new(16_000_000_000, 2)),
            location: None,
            duration: Some(148),
            year: 2010,
            additional_details: None,
        }
    }

    #[test]
    fn test_movie_type_round_trip() {
        assert_eq!("TV Show".parse::<MovieType>(), Ok(MovieType::TvShow));
        assert_eq!(MovieType::Movie.to_string(), "Movie");
        assert!("Documentary".parse::<MovieType>().is_err());
    }

    #[test]
    fn test_movie_serializes_camel_case() {
        let now = Utc::now();
        let movie = Movie::from_new(1, sample(), now);
        let value = serde_json::to_value(&movie).unwrap();

        assert_eq!(value["id"], json!(1));
        assert_eq!(value["type"], json!("Movie"));
        assert_eq!(value["budget"], json!(160000000.0));
        assert_eq!(value["additionalDetails"], json!(null));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn test_apply_only_touches_provided_fields() {
        let created = Utc::now();
        let mut movie = Movie::from_new(1, sample(), created);
        let later = created + chrono::Duration::seconds(5);

        let update = MovieUpdate {
            title: Some("Inception (Director's Cut)".to_string()),
            location: Some(Some("Paris".to_string())),
            budget: Some(None),
            ..Default::default()
        };
        movie.apply(&update, later);

        assert_eq!(movie.title, "Inception (Director's Cut)");
        assert_eq!(movie.location.as_deref(), Some("Paris"));
        assert_eq!(movie.budget, None);
        assert_eq!(movie.director, "Nolan");
        assert_eq!(movie.duration, Some(148));
        assert_eq!(movie.created_at, created);
        assert_eq!(movie.updated_at, later);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(MovieUpdate::default().is_empty());
        let update = MovieUpdate {
            year: Some(1999),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
