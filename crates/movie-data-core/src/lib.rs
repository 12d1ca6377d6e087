pub mod outcome;
pub mod store;
pub mod movie_store;
pub mod review_store;
pub mod cache_storage;
pub mod merge;
pub mod report;
pub mod subscription;
pub mod repository;

#[cfg(test)]
mod fakes;

pub use outcome::{collect_outcomes, Outcome, OutcomeExt, VoidOutcome};
pub use store::{LocalMovieStore, LocalReviewStore, StoreError};
pub use movie_store::InMemoryMovieStore;
pub use review_store::InMemoryReviewStore;
pub use cache_storage::{CacheSnapshot, CacheStorage};
pub use report::{CollectingReporter, ErrorReporter, ReportedError, TracingReporter};
pub use subscription::MovieWithReviewsSubscription;
pub use repository::{MoviesRepository, SyncSummary};
