//! Movie catalog handlers.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /api/movies` | [`create_movie_handler`] |
//! | `GET /api/movies?page=&limit=` | [`list_movies_handler`] |
//! | `GET /api/movies/{id}` | [`get_movie_handler`] |
//! | `PUT /api/movies/{id}` | [`update_movie_handler`] |
//! | `DELETE /api/movies/{id}` | [`delete_movie_handler`] |

use axum::{Json, extract::State, http::StatusCode};
use marquee_persistence::core::MovieStorage;
use marquee_persistence::types::{Movie, validate_movie_update, validate_new_movie};
use tracing::{debug, info};

use crate::error::{RestError, RestResult};
use crate::extractors::{JsonBody, MovieId, Pagination};
use crate::responses::{DeleteResponse, MovieListResponse};
use crate::state::AppState;

/// Handler for creating a catalog entry.
///
/// # HTTP Request
///
/// `POST [base]/api/movies`
///
/// # Response
///
/// - `201 Created` - the stored record, with its assigned id
/// - `400 Bad Request` - validation failed (`VALIDATION_ERROR`)
///
/// # Example
///
/// ```http
/// POST /api/movies HTTP/1.1
/// Content-Type: application/json
///
/// {"title": "Inception", "type": "Movie", "director": "Nolan", "year": 2010, "duration": 148}
/// ```
pub async fn create_movie_handler<S>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody,
) -> RestResult<(StatusCode, Json<Movie>)>
where
    S: MovieStorage + Send + Sync,
{
    let input = validate_new_movie(&body)?;
    debug!(title = %input.title, kind = %input.kind, "Processing create request");

    let movie = state
        .storage()
        .create(input)
        .await
        .map_err(|e| RestError::storage("create movie", e))?;

    info!(id = movie.id, backend = state.storage().backend_name(), "Movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Handler for listing catalog entries, newest first.
///
/// # HTTP Request
///
/// `GET [base]/api/movies?page=1&limit=20`
///
/// # Response
///
/// - `200 OK` - `{ data, pagination }`
/// - `503 Service Unavailable` - the backend is not connected (`DATABASE_ERROR`)
pub async fn list_movies_handler<S>(
    State(state): State<AppState<S>>,
    pagination: Pagination,
) -> RestResult<Json<MovieListResponse>>
where
    S: MovieStorage + Send + Sync,
{
    debug!(
        page = pagination.page(),
        limit = pagination.limit(),
        "Processing list request"
    );

    let page = state
        .storage()
        .list(pagination.page_request())
        .await
        .map_err(|e| RestError::storage("fetch movies", e))?;

    Ok(Json(MovieListResponse::new(page, &pagination)))
}

/// Handler for reading one catalog entry.
///
/// # HTTP Request
///
/// `GET [base]/api/movies/{id}`
///
/// # Response
///
/// - `200 OK` - the record
/// - `400 Bad Request` - non-integer id (`INVALID_ID`)
/// - `404 Not Found` - no such record (`NOT_FOUND`)
pub async fn get_movie_handler<S>(
    State(state): State<AppState<S>>,
    MovieId(id): MovieId,
) -> RestResult<Json<Movie>>
where
    S: MovieStorage + Send + Sync,
{
    debug!(id, "Processing read request");

    state
        .storage()
        .get(id)
        .await
        .map_err(|e| RestError::storage("fetch movie", e))?
        .map(Json)
        .ok_or(RestError::NotFound)
}

/// Handler for partially updating a catalog entry.
///
/// When the storage reports no updated record the handler reads the id
/// again before answering 404, since a tier that missed the update may
/// still hold the record.
///
/// # HTTP Request
///
/// `PUT [base]/api/movies/{id}`
///
/// # Response
///
/// - `200 OK` - the updated record
/// - `400 Bad Request` - non-integer id or validation failure
/// - `404 Not Found` - no such record
pub async fn update_movie_handler<S>(
    State(state): State<AppState<S>>,
    MovieId(id): MovieId,
    JsonBody(body): JsonBody,
) -> RestResult<Json<Movie>>
where
    S: MovieStorage + Send + Sync,
{
    let update = validate_movie_update(&body)?;
    debug!(id, empty = update.is_empty(), "Processing update request");

    let updated = state
        .storage()
        .update(id, update)
        .await
        .map_err(|e| RestError::storage("update movie", e))?;

    let movie = match updated {
        Some(movie) => Some(movie),
        None => state
            .storage()
            .get(id)
            .await
            .map_err(|e| RestError::storage("update movie", e))?,
    };

    movie.map(Json).ok_or(RestError::NotFound)
}

/// Handler for deleting a catalog entry.
///
/// # HTTP Request
///
/// `DELETE [base]/api/movies/{id}`
///
/// # Response
///
/// - `200 OK` - `{ "message": "Entry deleted successfully", "id": <id> }`
/// - `400 Bad Request` - non-integer id
/// - `404 Not Found` - no such record
pub async fn delete_movie_handler<S>(
    State(state): State<AppState<S>>,
    MovieId(id): MovieId,
) -> RestResult<Json<DeleteResponse>>
where
    S: MovieStorage + Send + Sync,
{
    debug!(id, "Processing delete request");

    let deleted = state
        .storage()
        .delete(id)
        .await
        .map_err(|e| RestError::storage("delete movie", e))?;

    if !deleted {
        return Err(RestError::NotFound);
    }

    info!(id, "Movie deleted");
    Ok(Json(DeleteResponse::new(id)))
}
