//! Input validation for create and update payloads.
//!
//! Validation works on the raw JSON body so that every failing field is
//! reported at once, each with its own path and message.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::{Map, Value};

use crate::error::{ValidationDetail, ValidationError};

use super::{MovieType, MovieUpdate, NewMovie};

const TITLE_MAX: usize = 255;
const DIRECTOR_MAX: usize = 255;
const LOCATION_MAX: usize = 500;
const DETAILS_MAX: usize = 1000;
const YEAR_MIN: i64 = 1800;
const YEARS_AHEAD: i64 = 10;

/// Validates a create payload.
pub fn validate_new_movie(body: &Value) -> Result<NewMovie, ValidationError> {
    let fields = read_fields(body, true)?;
    match (fields.title, fields.kind, fields.director, fields.year) {
        (Some(title), Some(kind), Some(director), Some(year)) => Ok(NewMovie {
            title,
            kind,
            director,
            budget: fields.budget.flatten(),
            location: fields.location.flatten(),
            duration: fields.duration.flatten(),
            year,
            additional_details: fields.additional_details.flatten(),
        }),
        _ => Err(invalid(vec![ValidationDetail {
            path: Vec::new(),
            message: "Required fields are missing".to_string(),
        }])),
    }
}

/// Validates a partial update payload.
///
/// Every field is optional, but a payload that sets `type` to `"Movie"` must
/// also carry a duration.
pub fn validate_movie_update(body: &Value) -> Result<MovieUpdate, ValidationError> {
    read_fields(body, false)
}

fn invalid(details: Vec<ValidationDetail>) -> ValidationError {
    let message = details
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    ValidationError::InvalidMovie { message, details }
}

fn read_fields(body: &Value, required: bool) -> Result<MovieUpdate, ValidationError> {
    let Some(obj) = body.as_object() else {
        return Err(invalid(vec![ValidationDetail {
            path: Vec::new(),
            message: format!("Expected object, received {}", kind_of(body)),
        }]));
    };

    let mut checker = Checker {
        obj,
        required,
        issues: Vec::new(),
    };

    let update = MovieUpdate {
        title: checker.required_field("title", |c, v| {
            c.string("title", v, TITLE_MAX, "Title is required", "Title must be less than 255 characters")
        }),
        kind: checker.movie_type(),
        director: checker.required_field("director", |c, v| {
            c.string(
                "director",
                v,
                DIRECTOR_MAX,
                "Director is required",
                "Director must be less than 255 characters",
            )
        }),
        budget: checker.nullable_field("budget", |c, v| c.budget(v)),
        location: checker.nullable_field("location", |c, v| {
            c.bounded_string("location", v, LOCATION_MAX, "Location must be less than 500 characters")
        }),
        duration: checker.nullable_field("duration", |c, v| c.duration(v)),
        year: checker.required_field("year", |c, v| c.year(v)),
        additional_details: checker.nullable_field("additionalDetails", |c, v| {
            c.bounded_string(
                "additionalDetails",
                v,
                DETAILS_MAX,
                "Additional details must be less than 1000 characters",
            )
        }),
    };

    if update.kind == Some(MovieType::Movie) && !matches!(update.duration, Some(Some(_))) {
        // An invalid duration already has its own issue.
        let duration_reported = checker.issues.iter().any(|d| d.path == ["duration"]);
        if !duration_reported {
            checker
                .issues
                .push(ValidationDetail::field("duration", "Duration is required for movies"));
        }
    }

    if checker.issues.is_empty() {
        Ok(update)
    } else {
        Err(invalid(checker.issues))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns the value as an integer if it is a whole number.
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

struct Checker<'a> {
    obj: &'a Map<String, Value>,
    required: bool,
    issues: Vec<ValidationDetail>,
}

impl<'a> Checker<'a> {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(ValidationDetail::field(field, message));
    }

    /// A non-nullable field. Missing is an issue only on create.
    fn required_field<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&mut Self, &'a Value) -> Option<T>,
    ) -> Option<T> {
        match self.obj.get(field) {
            None => {
                if self.required {
                    self.push(field, "Required");
                }
                None
            }
            Some(Value::Null) => {
                self.push(field, "Expected a value, received null");
                None
            }
            Some(value) => parse(self, value),
        }
    }

    /// An optional, nullable field. `null` yields `Some(None)`.
    fn nullable_field<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&mut Self, &'a Value) -> Option<T>,
    ) -> Option<Option<T>> {
        match self.obj.get(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => parse(self, value).map(Some),
        }
    }

    fn movie_type(&mut self) -> Option<MovieType> {
        match self.obj.get("type") {
            None | Some(Value::Null) => {
                if self.required || self.obj.contains_key("type") {
                    self.push("type", "Type is required");
                }
                None
            }
            Some(Value::String(s)) => match s.parse() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    self.push(
                        "type",
                        format!("Invalid enum value. Expected 'Movie' | 'TV Show', received '{}'", s),
                    );
                    None
                }
            },
            Some(other) => {
                self.push("type", format!("Expected string, received {}", kind_of(other)));
                None
            }
        }
    }

    fn string(
        &mut self,
        field: &str,
        value: &Value,
        max: usize,
        empty_message: &str,
        max_message: &str,
    ) -> Option<String> {
        let s = self.bounded_string(field, value, max, max_message)?;
        if s.is_empty() {
            self.push(field, empty_message);
            return None;
        }
        Some(s)
    }

    fn bounded_string(
        &mut self,
        field: &str,
        value: &Value,
        max: usize,
        max_message: &str,
    ) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.push(field, format!("Expected string, received {}", kind_of(value)));
            return None;
        };
        if s.chars().count() > max {
            self.push(field, max_message);
            return None;
        }
        Some(s.to_string())
    }

    fn budget(&mut self, value: &Value) -> Option<Decimal> {
        let Some(f) = value.as_f64() else {
            self.push("budget", format!("Expected number, received {}", kind_of(value)));
            return None;
        };
        if f <= 0.0 {
            self.push("budget", "Budget must be positive");
            return None;
        }
        match Decimal::from_f64(f) {
            Some(d) => Some(d),
            None => {
                self.push("budget", "Budget is out of range");
                None
            }
        }
    }

    fn duration(&mut self, value: &Value) -> Option<i32> {
        if !value.is_number() {
            self.push("duration", format!("Expected number, received {}", kind_of(value)));
            return None;
        }
        let Some(n) = whole_number(value) else {
            self.push("duration", "Duration must be a whole number");
            return None;
        };
        if n <= 0 {
            self.push("duration", "Duration must be positive");
            return None;
        }
        match i32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                self.push("duration", "Duration is out of range");
                None
            }
        }
    }

    fn year(&mut self, value: &Value) -> Option<i32> {
        if !value.is_number() {
            self.push("year", format!("Expected number, received {}", kind_of(value)));
            return None;
        }
        let Some(n) = whole_number(value) else {
            self.push("year", "Year must be a whole number");
            return None;
        };
        if n < YEAR_MIN {
            self.push("year", "Year must be after 1800");
            return None;
        }
        if n > i64::from(Utc::now().year()) + YEARS_AHEAD {
            self.push("year", "Year cannot be too far in the future");
            return None;
        }
        i32::try_from(n).ok()
    }
}
