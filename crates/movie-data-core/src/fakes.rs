//! Hand-written remote sources and stores for repository tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use movie_data_models::{MovieId, MovieRecord, MyReviewRecord, ReviewDraft};
use movie_data_sources::{MovieDto, MyReviewDto, RemoteMovieSource, RemoteReviewSource, ReviewDto, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use crate::store::{LocalMovieStore, LocalReviewStore, StoreError};

pub fn movie_dto(id: u64, title: &str, runtime: Option<u32>) -> MovieDto {
    MovieDto {
        id,
        title: title.to_string(),
        release_date: Some("1999-03-31".to_string()),
        overview: Some(format!("About {}", title)),
        genres: Vec::new(),
        vote_average: 7.5,
        poster_url: None,
        runtime,
    }
}

pub fn review_dto(id: u64, movie_id: u64, author: &str) -> ReviewDto {
    ReviewDto {
        id,
        movie_id,
        author: author.to_string(),
        rating: Some(7),
        content: format!("Review {} by {}", id, author),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn my_review_dto(id: u64, movie_id: u64) -> MyReviewDto {
    MyReviewDto {
        id,
        movie_id,
        author_id: "u-1".to_string(),
        author_email: "viewer@example.com".to_string(),
        rating: 8,
        content: format!("My review {}", id),
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    }
}

#[derive(Default)]
pub struct FakeMovieSource {
    details: Mutex<HashMap<u64, MovieDto>>,
    search_hits: Mutex<Vec<MovieDto>>,
    fail_search: AtomicBool,
    failing_details: Mutex<HashSet<u64>>,
    detail_delay_ms: AtomicU64,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeMovieSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movie(self, dto: MovieDto) -> Self {
        self.details.lock().unwrap().insert(dto.id, dto);
        self
    }

    pub fn with_search_hits(self, hits: Vec<MovieDto>) -> Self {
        *self.search_hits.lock().unwrap() = hits;
        self
    }

    pub fn failing_search(self) -> Self {
        self.fail_search.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_details_for(self, id: u64) -> Self {
        self.failing_details.lock().unwrap().insert(id);
        self
    }

    pub fn with_detail_delay(self, delay: Duration) -> Self {
        self.detail_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteMovieSource for FakeMovieSource {
    async fn search_movies(&self, _query: &str, _page: u32) -> Result<Vec<MovieDto>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(SourceError::new("search unavailable"));
        }
        Ok(self.search_hits.lock().unwrap().clone())
    }

    async fn get_movie_details(&self, id: MovieId) -> Result<MovieDto, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.detail_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.failing_details.lock().unwrap().contains(&id.0) {
            return Err(SourceError::new(format!("details unavailable for {}", id)));
        }
        self.details
            .lock()
            .unwrap()
            .get(&id.0)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                status: 404,
                body: format!("movie {} not found", id),
            })
    }
}

#[derive(Default)]
pub struct FakeReviewSource {
    reviews: Mutex<HashMap<u64, Vec<ReviewDto>>>,
    failing_reviews: Mutex<HashSet<u64>>,
    my_reviews: Mutex<Vec<MyReviewDto>>,
    fail_my_reviews: AtomicBool,
    fail_add: AtomicBool,
    next_review_id: AtomicU64,
    review_delay_ms: AtomicU64,
    review_calls: AtomicUsize,
    add_calls: AtomicUsize,
}

impl FakeReviewSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reviews(self, movie_id: u64, reviews: Vec<ReviewDto>) -> Self {
        self.reviews.lock().unwrap().insert(movie_id, reviews);
        self
    }

    pub fn failing_reviews_for(self, movie_id: u64) -> Self {
        self.failing_reviews.lock().unwrap().insert(movie_id);
        self
    }

    pub fn with_my_reviews(self, reviews: Vec<MyReviewDto>) -> Self {
        *self.my_reviews.lock().unwrap() = reviews;
        self
    }

    pub fn failing_my_reviews(self) -> Self {
        self.fail_my_reviews.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_add(self) -> Self {
        self.fail_add.store(true, Ordering::SeqCst);
        self
    }

    /// Id the server assigns to the next submitted review
    pub fn with_next_review_id(self, id: u64) -> Self {
        self.next_review_id.store(id, Ordering::SeqCst);
        self
    }

    pub fn with_review_delay(self, delay: Duration) -> Self {
        self.review_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
        self
    }

    pub fn review_calls(&self) -> usize {
        self.review_calls.load(Ordering::SeqCst)
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteReviewSource for FakeReviewSource {
    async fn get_movie_reviews(&self, id: MovieId) -> Result<Vec<ReviewDto>, SourceError> {
        self.review_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.review_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.failing_reviews.lock().unwrap().contains(&id.0) {
            return Err(SourceError::new(format!("reviews unavailable for {}", id)));
        }
        Ok(self.reviews.lock().unwrap().get(&id.0).cloned().unwrap_or_default())
    }

    async fn get_my_reviews(&self, _user_id: &str) -> Result<Vec<MyReviewDto>, SourceError> {
        if self.fail_my_reviews.load(Ordering::SeqCst) {
            return Err(SourceError::new("my reviews unavailable"));
        }
        Ok(self.my_reviews.lock().unwrap().clone())
    }

    async fn add_review(
        &self,
        draft: &ReviewDraft,
        author_id: &str,
        author_email: &str,
    ) -> Result<MyReviewDto, SourceError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(SourceError::Status {
                status: 422,
                body: "review rejected".to_string(),
            });
        }
        Ok(MyReviewDto {
            id: self.next_review_id.fetch_add(1, Ordering::SeqCst),
            movie_id: draft.movie_id.0,
            author_id: author_id.to_string(),
            author_email: author_email.to_string(),
            rating: draft.rating,
            content: draft.text.clone(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        })
    }
}

/// Movie store whose writes always fail
#[derive(Default)]
pub struct ReadOnlyMovieStore;

#[async_trait]
impl LocalMovieStore for ReadOnlyMovieStore {
    async fn get_by_id(&self, _id: MovieId) -> Result<Option<MovieRecord>, StoreError> {
        Ok(None)
    }

    async fn insert(&self, _record: MovieRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }

    async fn insert_all(&self, _records: Vec<MovieRecord>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }
}

/// Review store whose writes always fail
#[derive(Default)]
pub struct ReadOnlyReviewStore;

#[async_trait]
impl LocalReviewStore for ReadOnlyReviewStore {
    async fn get_by_movie_id(&self, _id: MovieId) -> Result<Option<MyReviewRecord>, StoreError> {
        Ok(None)
    }

    async fn get_by_movie_ids(&self, _ids: &[MovieId]) -> Result<Vec<MyReviewRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn observe_review(&self, _id: MovieId) -> Result<watch::Receiver<Option<MyReviewRecord>>, StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }

    async fn insert(&self, _record: MyReviewRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }

    async fn insert_all(&self, _records: Vec<MyReviewRecord>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }
}

/// Review store whose lookups fail; observing and writing work
#[derive(Default)]
pub struct UnreadableReviewStore {
    inner: crate::review_store::InMemoryReviewStore,
}

#[async_trait]
impl LocalReviewStore for UnreadableReviewStore {
    async fn get_by_movie_id(&self, _id: MovieId) -> Result<Option<MyReviewRecord>, StoreError> {
        Err(StoreError::Unavailable("unreadable".to_string()))
    }

    async fn get_by_movie_ids(&self, _ids: &[MovieId]) -> Result<Vec<MyReviewRecord>, StoreError> {
        Err(StoreError::Unavailable("unreadable".to_string()))
    }

    async fn observe_review(&self, id: MovieId) -> Result<watch::Receiver<Option<MyReviewRecord>>, StoreError> {
        self.inner.observe_review(id).await
    }

    async fn insert(&self, record: MyReviewRecord) -> Result<(), StoreError> {
        self.inner.insert(record).await
    }

    async fn insert_all(&self, records: Vec<MyReviewRecord>) -> Result<(), StoreError> {
        self.inner.insert_all(records).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.inner.delete_all().await
    }
}
