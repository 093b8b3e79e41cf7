//! Record fixtures.

use marquee_persistence::types::{MovieType, MovieUpdate, NewMovie};

/// The canonical feature film.
pub fn inception() -> NewMovie {
    NewMovie {
        title: "Inception".to_string(),
        kind: MovieType::Movie,
        director: "Nolan".to_string(),
        budget: None,
        location: Some("Los Angeles".to_string()),
        duration: Some(148),
        year: 2010,
        additional_details: None,
    }
}

/// A TV show without a duration.
pub fn show(title: &str) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        kind: MovieType::TvShow,
        director: "X".to_string(),
        budget: None,
        location: None,
        duration: None,
        year: 2020,
        additional_details: None,
    }
}

/// An update that only renames a record.
pub fn rename(title: &str) -> MovieUpdate {
    MovieUpdate {
        title: Some(title.to_string()),
        ..Default::default()
    }
}
