//! MovieStorage and NetworkedStorage implementations for MongoDB.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{Document, doc};
use mongodb::options::ReturnDocument;
use tracing::warn;

use crate::core::{BackendKind, MovieStorage, NetworkedStorage};
use crate::error::StorageResult;
use crate::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};

use super::MongoBackend;
use super::backend::{MOVIES_COUNTER_ID, mongo_error};
use super::document::{
    bson_i64, id_filter, movie_from_document, movie_to_document, update_document,
};

impl MongoBackend {
    /// Hands out the next id from the counter document.
    ///
    /// Falls back to reading the counter, then to 1, if the atomic increment
    /// returns no document.
    async fn next_id(&self) -> StorageResult<i64> {
        let counters = self.counters().await?;

        let updated = counters
            .find_one_and_update(doc! { "_id": MOVIES_COUNTER_ID }, doc! { "$inc": { "seq": 1 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| mongo_error("Failed to increment movie id counter", e))?;

        if let Some(seq) = updated.as_ref().and_then(|d| d.get("seq")).and_then(bson_i64) {
            return Ok(seq);
        }

        let current = counters
            .find_one(doc! { "_id": MOVIES_COUNTER_ID })
            .await
            .map_err(|e| mongo_error("Failed to read movie id counter", e))?;
        if let Some(seq) = current.as_ref().and_then(|d| d.get("seq")).and_then(bson_i64) {
            return Ok(seq);
        }

        warn!("Movie id counter returned no sequence, defaulting to 1");
        Ok(1)
    }

    async fn find_document(&self, id: i64) -> StorageResult<Option<Document>> {
        self.movies()
            .await?
            .find_one(id_filter(id))
            .await
            .map_err(|e| mongo_error("Failed to read movie", e))
    }
}

#[async_trait]
impl MovieStorage for MongoBackend {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::MongoDB
    }

    async fn create(&self, input: NewMovie) -> StorageResult<Movie> {
        let collection = self.movies().await?;
        let id = self.next_id().await?;

        let movie = Movie::from_new(id, input, Utc::now());
        collection
            .insert_one(movie_to_document(&movie))
            .await
            .map_err(|e| mongo_error("Failed to insert movie", e))?;

        // Return what a subsequent read would see.
        movie_from_document(&movie_to_document(&movie))
    }

    async fn list(&self, page: PageRequest) -> StorageResult<MoviePage> {
        let collection = self.movies().await?;
        let limit = i64::from(page.limit);

        let documents = async {
            let mut cursor = collection
                .find(doc! {})
                .sort(doc! { "createdAt": -1, "id": -1 })
                .skip(page.offset())
                .limit(limit)
                .await?;
            let mut documents = Vec::new();
            while cursor.advance().await? {
                documents.push(cursor.deserialize_current()?);
            }
            Ok::<_, mongodb::error::Error>(documents)
        };

        let (documents, total) = tokio::try_join!(documents, async {
            collection.count_documents(doc! {}).await
        })
        .map_err(|e| mongo_error("Failed to list movies", e))?;

        let data = documents
            .iter()
            .map(movie_from_document)
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(MoviePage::new(data, total))
    }

    async fn get(&self, id: i64) -> StorageResult<Option<Movie>> {
        self.find_document(id)
            .await?
            .as_ref()
            .map(movie_from_document)
            .transpose()
    }

    async fn update(&self, id: i64, update: MovieUpdate) -> StorageResult<Option<Movie>> {
        let collection = self.movies().await?;

        let result = collection
            .update_one(id_filter(id), doc! { "$set": update_document(&update, Utc::now()) })
            .await
            .map_err(|e| mongo_error("Failed to update movie", e))?;
        if result.matched_count == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let Some(existing) = self.find_document(id).await? else {
            return Ok(false);
        };
        let Some(internal_id) = existing.get("_id").cloned() else {
            return Ok(false);
        };

        let result = self
            .movies()
            .await?
            .delete_one(doc! { "_id": internal_id })
            .await
            .map_err(|e| mongo_error("Failed to delete movie", e))?;
        Ok(result.deleted_count == 1)
    }
}

#[async_trait]
impl NetworkedStorage for MongoBackend {
    async fn verify_connection(&self) -> StorageResult<()> {
        self.ping().await
    }

    async fn upsert(&self, movie: &Movie) -> StorageResult<()> {
        self.movies()
            .await?
            .update_one(id_filter(movie.id), doc! { "$set": movie_to_document(movie) })
            .upsert(true)
            .await
            .map_err(|e| mongo_error("Failed to upsert movie", e))?;

        // Never hand out an id at or below one we have mirrored.
        self.counters()
            .await?
            .update_one(
                doc! { "_id": MOVIES_COUNTER_ID },
                doc! { "$max": { "seq": movie.id } },
            )
            .upsert(true)
            .await
            .map_err(|e| mongo_error("Failed to advance movie id counter", e))?;

        Ok(())
    }
}
