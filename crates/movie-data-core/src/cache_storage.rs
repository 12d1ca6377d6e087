use anyhow::Result;
use bincode::{deserialize, serialize};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use movie_data_models::{MovieRecord, MyReviewRecord};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use crate::movie_store::InMemoryMovieStore;
use crate::review_store::InMemoryReviewStore;

/// Everything the local stores hold, in persistable form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheSnapshot {
    pub movies: Vec<MovieRecord>,
    pub reviews: Vec<MyReviewRecord>,
}

impl CacheSnapshot {
    pub fn from_stores(movies: &InMemoryMovieStore, reviews: &InMemoryReviewStore) -> Result<Self> {
        Ok(Self {
            movies: movies.records()?,
            reviews: reviews.records()?,
        })
    }

    pub fn into_stores(self) -> (InMemoryMovieStore, InMemoryReviewStore) {
        (
            InMemoryMovieStore::from_records(self.movies),
            InMemoryReviewStore::from_records(self.reviews),
        )
    }
}

/// On-disk snapshot of the local stores
///
/// Binary format (bincode) with optional gzip compression.
pub struct CacheStorage {
    snapshot_path: PathBuf,
    use_compression: bool,
}

impl CacheStorage {
    pub fn new(snapshot_path: &Path) -> Self {
        Self {
            snapshot_path: snapshot_path.to_path_buf(),
            use_compression: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Load the snapshot, or an empty one when there is none yet
    pub fn load(&self) -> Result<CacheSnapshot> {
        if !self.snapshot_path.exists() {
            debug!("Cache snapshot does not exist, starting with empty stores");
            return Ok(CacheSnapshot::default());
        }

        let start = std::time::Instant::now();
        let data = std::fs::read(&self.snapshot_path)?;

        let decoded = if self.use_compression {
            let mut decoder = GzDecoder::new(&data[..]);
            let mut decompressed = Vec::new();
            match decoder.read_to_end(&mut decompressed) {
                Ok(_) => decompressed,
                Err(e) => return Ok(self.discard_incompatible(&e.to_string())),
            }
        } else {
            data
        };

        let snapshot: CacheSnapshot = match deserialize(&decoded) {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(self.discard_incompatible(&e.to_string())),
        };

        info!(
            "Loaded cache snapshot: {} movies, {} reviews in {:?}",
            snapshot.movies.len(),
            snapshot.reviews.len(),
            start.elapsed()
        );
        Ok(snapshot)
    }

    /// Back up a snapshot we cannot read (usually a schema change) and start empty
    fn discard_incompatible(&self, reason: &str) -> CacheSnapshot {
        let backup_path = self.snapshot_path.with_extension("bin.bak");
        match std::fs::copy(&self.snapshot_path, &backup_path) {
            Ok(_) => info!(
                "Cache snapshot incompatible (error: {}). Backed up to {:?} and starting with empty stores.",
                reason, backup_path
            ),
            Err(backup_err) => warn!(
                "Failed to back up incompatible cache snapshot: {}. Starting with empty stores.",
                backup_err
            ),
        }
        CacheSnapshot::default()
    }

    pub fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let start = std::time::Instant::now();
        let serialized = serialize(snapshot)?;

        let encoded = if self.use_compression {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&serialized)?;
            encoder.finish()?
        } else {
            serialized
        };

        if let Some(parent) = self.snapshot_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Atomic write: write to temp file, then rename
        let temp_path = self.snapshot_path.with_extension("tmp");
        std::fs::write(&temp_path, encoded)?;
        std::fs::rename(&temp_path, &self.snapshot_path)?;

        info!(
            "Saved cache snapshot: {} movies, {} reviews in {:?}",
            snapshot.movies.len(),
            snapshot.reviews.len(),
            start.elapsed()
        );
        Ok(())
    }

    /// Save only if either store changed since it was loaded or last saved
    pub fn save_if_dirty(&self, movies: &InMemoryMovieStore, reviews: &InMemoryReviewStore) -> Result<bool> {
        // Flags are cleared before the snapshot is taken so a concurrent write stays dirty
        let movies_dirty = movies.take_dirty();
        let reviews_dirty = reviews.take_dirty();
        if !movies_dirty && !reviews_dirty {
            debug!("Cache unchanged, skipping snapshot save");
            return Ok(false);
        }

        let saved = CacheSnapshot::from_stores(movies, reviews).and_then(|snapshot| self.save(&snapshot));
        if let Err(e) = saved {
            if movies_dirty {
                movies.mark_dirty();
            }
            if reviews_dirty {
                reviews.mark_dirty();
            }
            return Err(e);
        }
        Ok(true)
    }

    pub fn clear(&self) -> Result<bool> {
        if self.snapshot_path.exists() {
            std::fs::remove_file(&self.snapshot_path)?;
            info!("Removed cache snapshot {:?}", self.snapshot_path);
            return Ok(true);
        }
        Ok(false)
    }

    pub fn size(&self) -> Result<u64> {
        if self.snapshot_path.exists() {
            Ok(std::fs::metadata(&self.snapshot_path)?.len())
        } else {
            Ok(0)
        }
    }

    pub fn set_compression(&mut self, use_compression: bool) {
        self.use_compression = use_compression;
    }
}
