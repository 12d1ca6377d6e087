use color_eyre::Result;
use movie_data_config::{Config, CredentialStore, PathManager, Session};
use movie_data_core::{CacheStorage, ErrorReporter, InMemoryMovieStore, InMemoryReviewStore, MoviesRepository};
use movie_data_sources::ApiClient;
use std::sync::Arc;

/// Everything a command needs: configuration, credentials and a wired repository
pub struct AppContext {
    pub config: Config,
    pub credentials: CredentialStore,
    pub repository: MoviesRepository,
    movie_store: InMemoryMovieStore,
    review_store: InMemoryReviewStore,
    storage: Option<CacheStorage>,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        Self::load_from(PathManager::default())
    }

    pub fn load_from(paths: PathManager) -> Result<Self> {
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        let credentials_file = paths.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        let client = Arc::new(
            ApiClient::from_config(&config.api, credentials.get_access_token().cloned())
                .map_err(|e| color_eyre::eyre::eyre!("Failed to create API client: {}", e))?,
        );

        let storage = config
            .cache
            .persist
            .then(|| CacheStorage::new(&paths.cache_snapshot_file(&config.cache.snapshot_file)));
        let (movie_store, review_store) = match &storage {
            Some(storage) => storage
                .load()
                .map_err(|e| color_eyre::eyre::eyre!("Failed to load cache from {}: {}", storage.path().display(), e))?
                .into_stores(),
            None => (InMemoryMovieStore::new(), InMemoryReviewStore::new()),
        };
        tracing::debug!(
            movies = movie_store.len(),
            reviews = review_store.len(),
            "Local stores ready"
        );

        let repository = MoviesRepository::new(
            client.clone(),
            client,
            Arc::new(movie_store.clone()),
            Arc::new(review_store.clone()),
        )
        .with_movie_warming(config.sync.warm_movie_details);

        Ok(Self {
            config,
            credentials,
            repository,
            movie_store,
            review_store,
            storage,
        })
    }

    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.repository = self.repository.with_error_reporter(reporter);
        self
    }

    pub fn require_session(&self) -> Result<Session> {
        self.credentials
            .session()
            .ok_or_else(|| color_eyre::eyre::eyre!("Not logged in. Run 'reelnotes login' first."))
    }

    pub fn movie_store(&self) -> &InMemoryMovieStore {
        &self.movie_store
    }

    pub fn review_store(&self) -> &InMemoryReviewStore {
        &self.review_store
    }

    /// Write the stores back to disk if anything changed
    pub fn persist(&self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        storage
            .save_if_dirty(&self.movie_store, &self.review_store)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save cache to {}: {}", storage.path().display(), e))?;
        Ok(())
    }
}
