//! MovieStorage and NetworkedStorage implementations for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::debug;

use crate::core::{BackendKind, MovieStorage, NetworkedStorage};
use crate::error::{BackendError, StorageError, StorageResult};
use crate::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};

use super::PostgresBackend;

const MOVIE_COLUMNS: &str = "id, title, type, director, budget, location, duration, year, \
                             additional_details, created_at, updated_at";

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "postgres".to_string(),
        message,
        source: None,
    })
}

fn serialization_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::SerializationError { message })
}

/// Timestamps are kept at millisecond precision so mirrored copies compare
/// equal to the primary's record.
fn millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

fn row_to_movie(row: &Row) -> StorageResult<Movie> {
    let column = |e: tokio_postgres::Error| serialization_error(format!("Bad movie row: {}", e));

    let kind: String = row.try_get("type").map_err(column)?;
    let kind = kind.parse().map_err(serialization_error)?;

    Ok(Movie {
        id: row.try_get("id").map_err(column)?,
        title: row.try_get("title").map_err(column)?,
        kind,
        director: row.try_get("director").map_err(column)?,
        budget: row.try_get::<_, Option<Decimal>>("budget").map_err(column)?,
        location: row.try_get("location").map_err(column)?,
        duration: row.try_get("duration").map_err(column)?,
        year: row.try_get("year").map_err(column)?,
        additional_details: row.try_get("additional_details").map_err(column)?,
        created_at: millis(row.try_get("created_at").map_err(column)?),
        updated_at: millis(row.try_get("updated_at").map_err(column)?),
    })
}

/// Builds the `SET` list of a partial update. Returns the clauses and their
/// parameters; the id is bound as the last parameter.
fn update_assignments(update: &MovieUpdate) -> (Vec<String>, Vec<Box<dyn ToSql + Sync + Send>>) {
    let mut sets = Vec::new();
    let mut params: Vec<Box<dyn ToSql + Sync + Send>> = Vec::new();

    let mut assign = |column: &str, value: Box<dyn ToSql + Sync + Send>| {
        params.push(value);
        sets.push(format!("{} = ${}", column, params.len()));
    };

    if let Some(title) = &update.title {
        assign("title", Box::new(title.clone()));
    }
    if let Some(kind) = update.kind {
        assign("type", Box::new(kind.as_str()));
    }
    if let Some(director) = &update.director {
        assign("director", Box::new(director.clone()));
    }
    if let Some(budget) = update.budget {
        assign("budget", Box::new(budget));
    }
    if let Some(location) = &update.location {
        assign("location", Box::new(location.clone()));
    }
    if let Some(duration) = update.duration {
        assign("duration", Box::new(duration));
    }
    if let Some(year) = update.year {
        assign("year", Box::new(year));
    }
    if let Some(details) = &update.additional_details {
        assign("additional_details", Box::new(details.clone()));
    }

    sets.push("updated_at = NOW()".to_string());
    (sets, params)
}

#[async_trait]
impl MovieStorage for PostgresBackend {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Postgres
    }

    async fn create(&self, input: NewMovie) -> StorageResult<Movie> {
        let client = self.get_client().await?;

        let row = client
            .query_one(
                "INSERT INTO movies (title, type, director, budget, location, duration, year, additional_details)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING id",
                &[
                    &input.title,
                    &input.kind.as_str(),
                    &input.director,
                    &input.budget,
                    &input.location,
                    &input.duration,
                    &input.year,
                    &input.additional_details,
                ],
            )
            .await
            .map_err(|e| internal_error(format!("Failed to insert movie: {}", e)))?;
        let id: i64 = row.get(0);
        drop(client);

        // Re-read so defaults applied by the database are reflected.
        self.get(id)
            .await?
            .ok_or_else(|| internal_error(format!("Failed to create movie: row {} vanished", id)))
    }

    async fn list(&self, page: PageRequest) -> StorageResult<MoviePage> {
        let client = self.get_client().await?;
        let limit = i64::from(page.limit);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let list_sql = format!(
            "SELECT {} FROM movies ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            MOVIE_COLUMNS
        );
        let list_params: [&(dyn ToSql + Sync); 2] = [&limit, &offset];
        let (rows, count) = tokio::try_join!(
            client.query(list_sql.as_str(), &list_params),
            client.query_one("SELECT COUNT(*) FROM movies", &[]),
        )
        .map_err(|e| internal_error(format!("Failed to list movies: {}", e)))?;

        let data = rows.iter().map(row_to_movie).collect::<StorageResult<Vec<_>>>()?;
        let total: i64 = count.get(0);

        Ok(MoviePage::new(data, total.max(0) as u64))
    }

    async fn get(&self, id: i64) -> StorageResult<Option<Movie>> {
        let client = self.get_client().await?;

        let sql = format!("SELECT {} FROM movies WHERE id = $1 LIMIT 1", MOVIE_COLUMNS);
        let row = client
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(|e| internal_error(format!("Failed to read movie: {}", e)))?;

        row.as_ref().map(row_to_movie).transpose()
    }

    async fn update(&self, id: i64, update: MovieUpdate) -> StorageResult<Option<Movie>> {
        let client = self.get_client().await?;

        let (sets, mut params) = update_assignments(&update);
        params.push(Box::new(id));
        let sql = format!(
            "UPDATE movies SET {} WHERE id = ${}",
            sets.join(", "),
            params.len()
        );
        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = client
            .execute(sql.as_str(), &refs)
            .await
            .map_err(|e| internal_error(format!("Failed to update movie: {}", e)))?;
        debug!(id, rows, "Updated movie row");
        drop(client);

        self.get(id).await
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let client = self.get_client().await?;

        let rows = client
            .execute("DELETE FROM movies WHERE id = $1", &[&id])
            .await
            .map_err(|e| internal_error(format!("Failed to delete movie: {}", e)))?;

        Ok(rows >= 1)
    }
}

#[async_trait]
impl NetworkedStorage for PostgresBackend {
    async fn verify_connection(&self) -> StorageResult<()> {
        let client = self.get_client().await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    async fn upsert(&self, movie: &Movie) -> StorageResult<()> {
        let client = self.get_client().await?;

        client
            .execute(
                "INSERT INTO movies (id, title, type, director, budget, location, duration, year, additional_details, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    type = EXCLUDED.type,
                    director = EXCLUDED.director,
                    budget = EXCLUDED.budget,
                    location = EXCLUDED.location,
                    duration = EXCLUDED.duration,
                    year = EXCLUDED.year,
                    additional_details = EXCLUDED.additional_details,
                    created_at = EXCLUDED.created_at,
                    updated_at = EXCLUDED.updated_at",
                &[
                    &movie.id,
                    &movie.title,
                    &movie.kind.as_str(),
                    &movie.director,
                    &movie.budget,
                    &movie.location,
                    &movie.duration,
                    &movie.year,
                    &movie.additional_details,
                    &movie.created_at,
                    &movie.updated_at,
                ],
            )
            .await
            .map_err(|e| internal_error(format!("Failed to upsert movie: {}", e)))?;

        // Keep the serial ahead of explicitly written ids.
        client
            .execute(
                "SELECT setval(pg_get_serial_sequence('movies', 'id'), GREATEST((SELECT MAX(id) FROM movies), $1))",
                &[&movie.id],
            )
            .await
            .map_err(|e| internal_error(format!("Failed to advance id sequence: {}", e)))?;

        Ok(())
    }
}
