use async_trait::async_trait;
use movie_data_models::{MovieId, MovieRecord, MyReviewRecord};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Cache of movie records keyed by id
///
/// Every write replaces the whole record for its id.
#[async_trait]
pub trait LocalMovieStore: Send + Sync {
    async fn get_by_id(&self, id: MovieId) -> Result<Option<MovieRecord>, StoreError>;
    async fn insert(&self, record: MovieRecord) -> Result<(), StoreError>;
    async fn insert_all(&self, records: Vec<MovieRecord>) -> Result<(), StoreError>;
}

/// The signed-in user's own reviews, at most one per movie (last insert wins)
#[async_trait]
pub trait LocalReviewStore: Send + Sync {
    async fn get_by_movie_id(&self, id: MovieId) -> Result<Option<MyReviewRecord>, StoreError>;

    /// Batched lookup; movies without a review are simply absent from the result
    async fn get_by_movie_ids(&self, ids: &[MovieId]) -> Result<Vec<MyReviewRecord>, StoreError>;

    /// Live view of the review for one movie
    ///
    /// The receiver starts at the current value and sees every later insert or
    /// delete. Dropping it releases the watch.
    async fn observe_review(&self, id: MovieId) -> Result<watch::Receiver<Option<MyReviewRecord>>, StoreError>;

    async fn insert(&self, record: MyReviewRecord) -> Result<(), StoreError>;
    async fn insert_all(&self, records: Vec<MyReviewRecord>) -> Result<(), StoreError>;
    async fn delete_all(&self) -> Result<(), StoreError>;
}
