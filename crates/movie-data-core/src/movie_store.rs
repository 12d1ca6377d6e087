use async_trait::async_trait;
use movie_data_models::{MovieId, MovieRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::trace;
use crate::store::{LocalMovieStore, StoreError};

/// In-memory movie cache
///
/// Clone-friendly via Arc; clones share the same map. Tracks a dirty flag so
/// the snapshot is only rewritten when something changed.
#[derive(Clone, Default)]
pub struct InMemoryMovieStore {
    movies: Arc<RwLock<HashMap<MovieId, MovieRecord>>>,
    dirty: Arc<AtomicBool>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted records, starting clean
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let movies = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            movies: Arc::new(RwLock::new(movies)),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// All records sorted by id
    pub fn records(&self) -> Result<Vec<MovieRecord>, StoreError> {
        let movies = self.movies.read().map_err(|_| StoreError::Poisoned)?;
        let mut records: Vec<MovieRecord> = movies.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    pub fn len(&self) -> usize {
        self.movies.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fully_loaded_count(&self) -> usize {
        self.movies
            .read()
            .map(|m| m.values().filter(|r| r.is_fully_loaded()).count())
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
impl LocalMovieStore for InMemoryMovieStore {
    async fn get_by_id(&self, id: MovieId) -> Result<Option<MovieRecord>, StoreError> {
        let movies = self.movies.read().map_err(|_| StoreError::Poisoned)?;
        Ok(movies.get(&id).cloned())
    }

    async fn insert(&self, record: MovieRecord) -> Result<(), StoreError> {
        trace!("Movie store: insert {} (fully loaded: {})", record.id, record.fully_loaded);
        let mut movies = self.movies.write().map_err(|_| StoreError::Poisoned)?;
        movies.insert(record.id, record);
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    async fn insert_all(&self, records: Vec<MovieRecord>) -> Result<(), StoreError> {
        trace!("Movie store: insert {} records", records.len());
        let mut movies = self.movies.write().map_err(|_| StoreError::Poisoned)?;
        for record in records {
            movies.insert(record.id, record);
        }
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }
}
