use async_trait::async_trait;
use movie_data_models::{MovieId, MyReviewRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, trace};
use crate::store::{LocalReviewStore, StoreError};

#[derive(Default)]
struct ReviewState {
    by_movie: HashMap<MovieId, MyReviewRecord>,
    /// One sender per observed movie; dropped once its last receiver is gone
    watchers: HashMap<MovieId, watch::Sender<Option<MyReviewRecord>>>,
}

impl ReviewState {
    fn prune_watchers(&mut self) {
        self.watchers.retain(|_, sender| sender.receiver_count() > 0);
    }

    fn publish(&self, id: MovieId) {
        if let Some(sender) = self.watchers.get(&id) {
            sender.send_replace(self.by_movie.get(&id).cloned());
        }
    }
}

/// In-memory, observable store of the signed-in user's reviews
#[derive(Clone, Default)]
pub struct InMemoryReviewStore {
    state: Arc<RwLock<ReviewState>>,
    dirty: Arc<AtomicBool>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<MyReviewRecord>) -> Self {
        let by_movie = records.into_iter().map(|r| (r.movie_id, r)).collect();
        Self {
            state: Arc::new(RwLock::new(ReviewState {
                by_movie,
                watchers: HashMap::new(),
            })),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// All reviews sorted by movie id
    pub fn records(&self) -> Result<Vec<MyReviewRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        let mut records: Vec<MyReviewRecord> = state.by_movie.values().cloned().collect();
        records.sort_by_key(|r| r.movie_id);
        Ok(records)
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.by_movie.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of movies that currently have a live observer
    pub fn active_watchers(&self) -> usize {
        self.state
            .read()
            .map(|s| s.watchers.values().filter(|w| w.receiver_count() > 0).count())
            .unwrap_or(0)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn mark_clean(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Clear the dirty flag, returning whether it was set
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

#[async_trait]
impl LocalReviewStore for InMemoryReviewStore {
    async fn get_by_movie_id(&self, id: MovieId) -> Result<Option<MyReviewRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.by_movie.get(&id).cloned())
    }

    async fn get_by_movie_ids(&self, ids: &[MovieId]) -> Result<Vec<MyReviewRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.by_movie.get(id).cloned())
            .collect())
    }

    async fn observe_review(&self, id: MovieId) -> Result<watch::Receiver<Option<MyReviewRecord>>, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        state.prune_watchers();

        if let Some(sender) = state.watchers.get(&id) {
            return Ok(sender.subscribe());
        }

        let (sender, receiver) = watch::channel(state.by_movie.get(&id).cloned());
        state.watchers.insert(id, sender);
        debug!("Review store: watching movie {}", id);
        Ok(receiver)
    }

    async fn insert(&self, record: MyReviewRecord) -> Result<(), StoreError> {
        trace!("Review store: insert review {} for movie {}", record.review_id, record.movie_id);
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let id = record.movie_id;
        state.by_movie.insert(id, record);
        state.prune_watchers();
        state.publish(id);
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    async fn insert_all(&self, records: Vec<MyReviewRecord>) -> Result<(), StoreError> {
        trace!("Review store: insert {} reviews", records.len());
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let mut touched = Vec::with_capacity(records.len());
        for record in records {
            touched.push(record.movie_id);
            state.by_movie.insert(record.movie_id, record);
        }
        state.prune_watchers();
        for id in touched {
            state.publish(id);
        }
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let removed = state.by_movie.len();
        state.by_movie.clear();
        state.prune_watchers();
        for sender in state.watchers.values() {
            sender.send_replace(None);
        }
        self.dirty.store(true, Ordering::Release);
        debug!("Review store: deleted {} reviews", removed);
        Ok(())
    }
}
