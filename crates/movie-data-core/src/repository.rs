use futures::future::join_all;
use movie_data_models::{
    MovieId, MovieRecord, MovieWithReviews, ReviewDraft, SearchMovieRecord, SearchMovieWithMyReview, SomeoneReview,
};
use movie_data_sources::{MovieDto, MyReviewDto, RemoteMovieSource, RemoteReviewSource, ReviewDto};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use crate::merge::{merge_movie_with_reviews, zip_search_with_my_reviews};
use crate::outcome::{collect_outcomes, Outcome, OutcomeExt, VoidOutcome};
use crate::report::{ErrorReporter, TracingReporter};
use crate::store::{LocalMovieStore, LocalReviewStore};
use crate::subscription::MovieWithReviewsSubscription;

/// What a review sync did; carries no error, failures go to the reporter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub reviews_synced: usize,
    pub movies_warmed: usize,
}

/// Reconciles remote movie data, remote reviews and the viewer's local reviews
///
/// Reads go to the local stores first where that is allowed; every successful
/// remote fetch is written through to the stores before it is returned. A
/// failing store write fails the operation it belongs to.
#[derive(Clone)]
pub struct MoviesRepository {
    movie_source: Arc<dyn RemoteMovieSource>,
    review_source: Arc<dyn RemoteReviewSource>,
    movie_store: Arc<dyn LocalMovieStore>,
    review_store: Arc<dyn LocalReviewStore>,
    reporter: Arc<dyn ErrorReporter>,
    warm_movie_details: bool,
}

impl MoviesRepository {
    pub fn new(
        movie_source: Arc<dyn RemoteMovieSource>,
        review_source: Arc<dyn RemoteReviewSource>,
        movie_store: Arc<dyn LocalMovieStore>,
        review_store: Arc<dyn LocalReviewStore>,
    ) -> Self {
        Self {
            movie_source,
            review_source,
            movie_store,
            review_store,
            reporter: Arc::new(TracingReporter),
            warm_movie_details: true,
        }
    }

    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Whether a review sync also fetches the details of every reviewed movie
    pub fn with_movie_warming(mut self, enabled: bool) -> Self {
        self.warm_movie_details = enabled;
        self
    }

    /// Search remotely, cache the hits as stubs and attach the viewer's reviews
    #[instrument(skip(self))]
    pub async fn search_movies_with_reviews(&self, query: &str, page: u32) -> Outcome<Vec<SearchMovieWithMyReview>> {
        let records = self
            .movie_source
            .search_movies(query, page)
            .await
            .map_success(|dtos| dtos.into_iter().map(MovieDto::into_stub_record).collect::<Vec<_>>())?;

        self.movie_store.insert_all(records.clone()).await?;

        let movies: Vec<SearchMovieRecord> = records.iter().map(MovieRecord::to_search_record).collect();
        let ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
        let my_reviews = self.review_store.get_by_movie_ids(&ids).await?;

        debug!(
            "Search '{}' page {}: {} hits, {} with own review",
            query,
            page,
            movies.len(),
            my_reviews.len()
        );
        Ok(zip_search_with_my_reviews(movies, my_reviews))
    }

    /// Cached record if fully loaded, otherwise fetch, cache and return it
    #[instrument(skip(self))]
    pub async fn get_movie_details(&self, id: MovieId) -> Outcome<MovieRecord> {
        if let Some(cached) = self.movie_store.get_by_id(id).await? {
            if cached.is_fully_loaded() {
                debug!("Cache hit: movie {}", id);
                return Ok(cached);
            }
            debug!("Cache stale: movie {} is a stub, fetching details", id);
        } else {
            debug!("Cache miss: movie {}", id);
        }

        let record = self
            .movie_source
            .get_movie_details(id)
            .await
            .map_success(MovieDto::into_full_record)
            .do_on_success(|record| debug!("Fetched details for '{}' ({})", record.title, record.id))?;

        self.movie_store.insert(record.clone()).await?;
        Ok(record)
    }

    /// Movie details, all remote reviews and the viewer's own review, fetched concurrently
    #[instrument(skip(self))]
    pub async fn get_movie_details_with_reviews(&self, id: MovieId) -> Outcome<MovieWithReviews> {
        let (reviews, movie, my_review) = tokio::join!(
            self.fetch_reviews(id),
            self.get_movie_details(id),
            self.review_store.get_by_movie_id(id),
        );

        // Detail failure takes priority over a reviews failure
        let movie = movie?;
        let reviews = reviews?;
        let my_review = my_review?;

        Ok(merge_movie_with_reviews(movie, my_review, reviews))
    }

    /// Live variant of `get_movie_details_with_reviews`
    ///
    /// Remote data is fetched once per subscription; the viewer's own review is
    /// followed in the local store and every change produces a new value.
    pub fn observe_movie_details_with_reviews(&self, id: MovieId) -> MovieWithReviewsSubscription {
        let repository = self.clone();

        MovieWithReviewsSubscription::spawn(id, move |emitter| async move {
            // Watch before fetching so a review written during the fetch is not missed
            let mut own_review = match repository.review_store.observe_review(id).await {
                Ok(receiver) => receiver,
                Err(e) => {
                    emitter.emit(Err(e.into())).await;
                    return;
                }
            };

            let (movie, reviews) = match repository.fetch_movie_and_reviews(id).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    emitter.emit(Err(e)).await;
                    return;
                }
            };

            let mut my_review = own_review.borrow_and_update().clone();
            loop {
                let combined = merge_movie_with_reviews(movie.clone(), my_review, reviews.clone());
                if !emitter.emit(Ok(combined)).await {
                    break;
                }
                if own_review.changed().await.is_err() {
                    break;
                }
                if !emitter.is_active() {
                    break;
                }
                my_review = own_review.borrow_and_update().clone();
            }
            debug!("Stopped observing movie {}", id);
        })
    }

    /// Submit a review; only a server-confirmed review is stored locally
    #[instrument(skip(self, draft), fields(movie_id = %draft.movie_id))]
    pub async fn add_review(&self, draft: &ReviewDraft, author_id: &str, author_email: &str) -> VoidOutcome {
        let record = self
            .review_source
            .add_review(draft, author_id, author_email)
            .await
            .map_success(MyReviewDto::into_record)?;

        let (review_id, movie_id) = (record.review_id, record.movie_id);
        self.review_store.insert(record).await?;
        info!("Review {} stored for movie {}", review_id, movie_id);
        Ok(())
    }

    /// Pull every review of the user into the local store and warm the movie cache
    ///
    /// Never fails towards the caller: failures go to the error reporter.
    #[instrument(skip(self))]
    pub async fn get_reviews_for_user(&self, user_id: &str) -> SyncSummary {
        let records = match self.review_source.get_my_reviews(user_id).await {
            Ok(dtos) => dtos.into_iter().map(MyReviewDto::into_record).collect::<Vec<_>>(),
            Err(e) => {
                self.reporter.report("get_reviews_for_user", &anyhow::Error::from(e));
                return SyncSummary::default();
            }
        };

        let movie_ids: BTreeSet<MovieId> = records.iter().map(|r| r.movie_id).collect();
        let reviews_synced = records.len();

        if let Err(e) = self.review_store.insert_all(records).await {
            self.reporter.report("get_reviews_for_user", &anyhow::Error::from(e));
            return SyncSummary::default();
        }
        info!("Synced {} reviews for {} movies", reviews_synced, movie_ids.len());

        if !self.warm_movie_details {
            return SyncSummary {
                reviews_synced,
                movies_warmed: 0,
            };
        }

        let outcomes = join_all(movie_ids.iter().map(|id| self.get_movie_details(*id))).await;
        let movies_warmed = outcomes.iter().filter(|o| o.is_ok()).count();
        if let Err(failures) = collect_outcomes(outcomes) {
            for failure in &failures {
                self.reporter.report("warm_movie_details", failure);
            }
        }

        SyncSummary {
            reviews_synced,
            movies_warmed,
        }
    }

    /// Forget every local review of the user (logout); no remote call
    #[instrument(skip(self))]
    pub async fn delete_user_reviews(&self) -> VoidOutcome {
        self.review_store.delete_all().await?;
        Ok(())
    }

    async fn fetch_reviews(&self, id: MovieId) -> Outcome<Vec<SomeoneReview>> {
        let reviews = self
            .review_source
            .get_movie_reviews(id)
            .await
            .map_success(|dtos| dtos.into_iter().map(ReviewDto::into_someone_review).collect())?;
        Ok(reviews)
    }

    async fn fetch_movie_and_reviews(&self, id: MovieId) -> Outcome<(MovieRecord, Vec<SomeoneReview>)> {
        let (reviews, movie) = tokio::join!(self.fetch_reviews(id), self.get_movie_details(id));
        movie.map_nested_success(|movie| reviews.map_success(|reviews| (movie, reviews)))
    }
}

#[cfg(test)]
mod tests;
