//! Conversion between [`Movie`] and BSON documents.
//!
//! Documents written by older deployments may carry `id` as a string and
//! `budget` as a string or integer; readers accept both encodings.

use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, DateTime as BsonDateTime, Document, doc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::error::{BackendError, StorageError, StorageResult};
use crate::types::{Movie, MovieUpdate};

/// Coerces a stored id to an integer. Unparsable or non-finite ids become 0.
pub fn normalize_id(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        Some(Bson::Double(f)) => finite_to_i64(*f),
        Some(Bson::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return 0;
            }
            s.parse::<f64>().map(finite_to_i64).unwrap_or(0)
        }
        _ => 0,
    }
}

fn finite_to_i64(f: f64) -> i64 {
    if f.is_finite() { f as i64 } else { 0 }
}

/// Matches a record whose id is stored either as a number or as its string form.
pub fn id_filter(id: i64) -> Document {
    doc! { "$or": [ { "id": id }, { "id": id.to_string() } ] }
}

/// Reads an integral number from any numeric BSON type.
pub(crate) fn bson_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
        _ => None,
    }
}

fn bson_date(dt: DateTime<Utc>) -> Bson {
    Bson::DateTime(BsonDateTime::from_millis(dt.timestamp_millis()))
}

fn optional_string(value: &Option<String>) -> Bson {
    match value {
        Some(s) => Bson::String(s.clone()),
        None => Bson::Null,
    }
}

fn optional_budget(value: Option<Decimal>) -> Bson {
    match value.and_then(|d| d.to_f64()) {
        Some(f) => Bson::Double(f),
        None => Bson::Null,
    }
}

fn optional_i32(value: Option<i32>) -> Bson {
    match value {
        Some(n) => Bson::Int32(n),
        None => Bson::Null,
    }
}

/// Converts a record into its stored document form (without `_id`).
pub fn movie_to_document(movie: &Movie) -> Document {
    doc! {
        "id": movie.id,
        "title": movie.title.as_str(),
        "type": movie.kind.as_str(),
        "director": movie.director.as_str(),
        "budget": optional_budget(movie.budget),
        "location": optional_string(&movie.location),
        "duration": optional_i32(movie.duration),
        "year": movie.year,
        "additionalDetails": optional_string(&movie.additional_details),
        "createdAt": bson_date(movie.created_at),
        "updatedAt": bson_date(movie.updated_at),
    }
}

/// Builds the `$set` document for a partial update.
pub fn update_document(update: &MovieUpdate, now: DateTime<Utc>) -> Document {
    let mut set = Document::new();
    if let Some(title) = &update.title {
        set.insert("title", title.as_str());
    }
    if let Some(kind) = update.kind {
        set.insert("type", kind.as_str());
    }
    if let Some(director) = &update.director {
        set.insert("director", director.as_str());
    }
    if let Some(budget) = update.budget {
        set.insert("budget", optional_budget(budget));
    }
    if let Some(location) = &update.location {
        set.insert("location", optional_string(location));
    }
    if let Some(duration) = update.duration {
        set.insert("duration", optional_i32(duration));
    }
    if let Some(year) = update.year {
        set.insert("year", year);
    }
    if let Some(details) = &update.additional_details {
        set.insert("additionalDetails", optional_string(details));
    }
    set.insert("updatedAt", bson_date(now));
    set
}

fn bad_document(message: String) -> StorageError {
    StorageError::Backend(BackendError::SerializationError { message })
}

fn required_str<'a>(doc: &'a Document, key: &str) -> StorageResult<&'a str> {
    doc.get_str(key)
        .map_err(|e| bad_document(format!("movie document field '{}': {}", key, e)))
}

fn optional_str(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key) {
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn read_i32(doc: &Document, key: &str) -> StorageResult<Option<i32>> {
    match doc.get(key) {
        None | Some(Bson::Null) => Ok(None),
        Some(value) => bson_i64(value)
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| bad_document(format!("movie document field '{}' is not an integer", key))),
    }
}

fn read_budget(doc: &Document) -> StorageResult<Option<Decimal>> {
    match doc.get("budget") {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Double(f)) => Ok(Decimal::from_f64(*f)),
        Some(Bson::Int32(n)) => Ok(Some(Decimal::from(*n))),
        Some(Bson::Int64(n)) => Ok(Some(Decimal::from(*n))),
        Some(Bson::String(s)) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| bad_document(format!("movie document budget '{}': {}", s, e))),
        Some(other) => Err(bad_document(format!(
            "movie document budget has unsupported type {:?}",
            other.element_type()
        ))),
    }
}

fn read_date(doc: &Document, key: &str) -> StorageResult<DateTime<Utc>> {
    match doc.get(key) {
        Some(Bson::DateTime(dt)) => DateTime::from_timestamp_millis(dt.timestamp_millis())
            .ok_or_else(|| bad_document(format!("movie document field '{}' out of range", key))),
        Some(Bson::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| bad_document(format!("movie document field '{}': {}", key, e))),
        _ => Err(bad_document(format!("movie document field '{}' is missing", key))),
    }
}

/// Converts a stored document back into a record, dropping `_id`.
pub fn movie_from_document(doc: &Document) -> StorageResult<Movie> {
    let kind = required_str(doc, "type")?
        .parse()
        .map_err(bad_document)?;
    let year = read_i32(doc, "year")?
        .ok_or_else(|| bad_document("movie document field 'year' is missing".to_string()))?;

    Ok(Movie {
        id: normalize_id(doc.get("id")),
        title: required_str(doc, "title")?.to_string(),
        kind,
        director: required_str(doc, "director")?.to_string(),
        budget: read_budget(doc)?,
        location: optional_str(doc, "location"),
        duration: read_i32(doc, "duration")?,
        year,
        additional_details: optional_str(doc, "additionalDetails"),
        created_at: read_date(doc, "createdAt")?,
        updated_at: read_date(doc, "updatedAt")?,
    })
}
