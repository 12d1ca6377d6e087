use super::*;
use crate::fakes::{movie_dto, my_review_dto, review_dto, FakeMovieSource, FakeReviewSource, ReadOnlyMovieStore, ReadOnlyReviewStore, UnreadableReviewStore};
use crate::movie_store::InMemoryMovieStore;
use crate::report::CollectingReporter;
use crate::review_store::InMemoryReviewStore;
use crate::store::StoreError;
use movie_data_sources::SourceError;
use std::time::{Duration, Instant};

struct Harness {
    repository: MoviesRepository,
    movie_source: Arc<FakeMovieSource>,
    review_source: Arc<FakeReviewSource>,
    movie_store: InMemoryMovieStore,
    review_store: InMemoryReviewStore,
    reporter: Arc<CollectingReporter>,
}

fn harness(movie_source: FakeMovieSource, review_source: FakeReviewSource) -> Harness {
    let movie_source = Arc::new(movie_source);
    let review_source = Arc::new(review_source);
    let movie_store = InMemoryMovieStore::new();
    let review_store = InMemoryReviewStore::new();
    let reporter = Arc::new(CollectingReporter::new());

    let repository = MoviesRepository::new(
        movie_source.clone(),
        review_source.clone(),
        Arc::new(movie_store.clone()),
        Arc::new(review_store.clone()),
    )
    .with_error_reporter(reporter.clone());

    Harness {
        repository,
        movie_source,
        review_source,
        movie_store,
        review_store,
        reporter,
    }
}

fn draft(movie_id: u64) -> ReviewDraft {
    ReviewDraft {
        movie_id: MovieId(movie_id),
        rating: 9,
        text: "Loved it".to_string(),
    }
}

async fn wait_for_no_watchers(store: &InMemoryReviewStore) {
    for _ in 0..50 {
        if store.active_watchers() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_details_are_fetched_once_then_cached() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(603, "The Matrix", Some(136))),
        FakeReviewSource::new(),
    );

    let first = h.repository.get_movie_details(MovieId(603)).await.unwrap();
    let second = h.repository.get_movie_details(MovieId(603)).await.unwrap();

    assert_eq!(first, second);
    assert!(second.is_fully_loaded());
    assert_eq!(h.movie_source.detail_calls(), 1);
}

#[tokio::test]
async fn test_fully_loaded_cache_entry_skips_remote() {
    let h = harness(FakeMovieSource::new(), FakeReviewSource::new());
    let cached = movie_dto(603, "The Matrix", Some(136)).into_full_record();
    h.movie_store.insert(cached.clone()).await.unwrap();

    let loaded = h.repository.get_movie_details(MovieId(603)).await.unwrap();

    assert_eq!(loaded, cached);
    assert_eq!(h.movie_source.detail_calls(), 0);
}

#[tokio::test]
async fn test_stub_in_cache_is_refreshed() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(603, "The Matrix", Some(136))),
        FakeReviewSource::new(),
    );
    h.movie_store
        .insert(movie_dto(603, "The Matrix", None).into_stub_record())
        .await
        .unwrap();

    let loaded = h.repository.get_movie_details(MovieId(603)).await.unwrap();

    assert!(loaded.is_fully_loaded());
    assert_eq!(loaded.duration_minutes, 136);
    assert_eq!(h.movie_source.detail_calls(), 1);
    let stored = h.movie_store.get_by_id(MovieId(603)).await.unwrap().unwrap();
    assert!(stored.is_fully_loaded());
}

#[tokio::test]
async fn test_details_failure_is_returned_and_nothing_cached() {
    let h = harness(FakeMovieSource::new(), FakeReviewSource::new());

    let err = h.repository.get_movie_details(MovieId(99)).await.unwrap_err();

    assert!(err.downcast_ref::<SourceError>().map(SourceError::is_not_found).unwrap_or(false));
    assert!(h.movie_store.is_empty());
}

#[tokio::test]
async fn test_store_write_failure_fails_details() {
    let movie_source = Arc::new(FakeMovieSource::new().with_movie(movie_dto(603, "The Matrix", Some(136))));
    let repository = MoviesRepository::new(
        movie_source.clone(),
        Arc::new(FakeReviewSource::new()),
        Arc::new(ReadOnlyMovieStore),
        Arc::new(InMemoryReviewStore::new()),
    );

    let err = repository.get_movie_details(MovieId(603)).await.unwrap_err();

    assert!(err.downcast_ref::<StoreError>().is_some());
    assert_eq!(movie_source.detail_calls(), 1);
}

#[tokio::test]
async fn test_search_caches_stubs_without_own_reviews() {
    let h = harness(
        FakeMovieSource::new().with_search_hits(vec![
            movie_dto(603, "The Matrix", None),
            movie_dto(604, "The Matrix Reloaded", None),
        ]),
        FakeReviewSource::new(),
    );

    let results = h.repository.search_movies_with_reviews("matrix", 1).await.unwrap();

    let ids: Vec<u64> = results.iter().map(|r| r.movie.id.0).collect();
    assert_eq!(ids, vec![603, 604]);
    assert!(results.iter().all(|r| r.my_review.is_none()));
    assert_eq!(results[0].movie.release_year, Some(1999));

    for id in [603, 604] {
        let stored = h.movie_store.get_by_id(MovieId(id)).await.unwrap().unwrap();
        assert!(!stored.is_fully_loaded());
    }
}

#[tokio::test]
async fn test_search_attaches_own_review_and_keeps_order() {
    let h = harness(
        FakeMovieSource::new().with_search_hits(vec![
            movie_dto(604, "The Matrix Reloaded", None),
            movie_dto(603, "The Matrix", None),
        ]),
        FakeReviewSource::new(),
    );
    h.review_store.insert(my_review_dto(42, 603).into_record()).await.unwrap();

    let results = h.repository.search_movies_with_reviews("matrix", 1).await.unwrap();

    assert_eq!(results[0].movie.id, MovieId(604));
    assert!(results[0].my_review.is_none());
    assert_eq!(results[1].movie.id, MovieId(603));
    assert_eq!(results[1].my_review.as_ref().map(|r| r.review_id), Some(42));
}

#[tokio::test]
async fn test_search_repeated_hit_gets_own_review_each_time() {
    let h = harness(
        FakeMovieSource::new().with_search_hits(vec![
            movie_dto(603, "The Matrix", None),
            movie_dto(603, "The Matrix", None),
        ]),
        FakeReviewSource::new(),
    );
    h.review_store.insert(my_review_dto(42, 603).into_record()).await.unwrap();

    let results = h.repository.search_movies_with_reviews("matrix", 1).await.unwrap();

    let own: Vec<Option<u64>> = results.iter().map(|r| r.my_review.as_ref().map(|m| m.review_id)).collect();
    assert_eq!(own, vec![Some(42), Some(42)]);
}

#[tokio::test]
async fn test_search_failure_writes_nothing() {
    let h = harness(FakeMovieSource::new().failing_search(), FakeReviewSource::new());

    assert!(h.repository.search_movies_with_reviews("matrix", 1).await.is_err());
    assert!(h.movie_store.is_empty());
    assert_eq!(h.movie_source.search_calls(), 1);
}

#[tokio::test]
async fn test_details_with_reviews_excludes_own_review() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new().with_reviews(
            7,
            vec![review_dto(41, 7, "ana"), review_dto(42, 7, "me"), review_dto(43, 7, "bo")],
        ),
    );
    h.review_store.insert(my_review_dto(42, 7).into_record()).await.unwrap();

    let combined = h.repository.get_movie_details_with_reviews(MovieId(7)).await.unwrap();

    assert_eq!(combined.movie.id, MovieId(7));
    assert_eq!(combined.my_review.as_ref().map(|r| r.review_id), Some(42));
    let others: Vec<u64> = combined.someone_else_reviews.iter().map(|r| r.review_id).collect();
    assert_eq!(others, vec![41, 43]);
}

#[tokio::test]
async fn test_details_with_reviews_fails_when_reviews_fail() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new().failing_reviews_for(7),
    );

    let err = h.repository.get_movie_details_with_reviews(MovieId(7)).await.unwrap_err();

    assert!(err.downcast_ref::<SourceError>().is_some());
    assert!(err.to_string().contains("reviews unavailable"));
}

#[tokio::test]
async fn test_details_failure_wins_over_reviews_failure() {
    let h = harness(
        FakeMovieSource::new().failing_details_for(7),
        FakeReviewSource::new().failing_reviews_for(7),
    );

    let err = h.repository.get_movie_details_with_reviews(MovieId(7)).await.unwrap_err();

    assert!(err.to_string().contains("details unavailable"));
}

fn repository_with_unreadable_reviews(movie_source: FakeMovieSource, review_source: FakeReviewSource) -> MoviesRepository {
    MoviesRepository::new(
        Arc::new(movie_source),
        Arc::new(review_source),
        Arc::new(InMemoryMovieStore::new()),
        Arc::new(UnreadableReviewStore::default()),
    )
}

#[tokio::test]
async fn test_own_review_lookup_failure_fails_combined_read() {
    let repository = repository_with_unreadable_reviews(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new(),
    );

    let err = repository.get_movie_details_with_reviews(MovieId(7)).await.unwrap_err();

    assert!(err.downcast_ref::<StoreError>().is_some());
}

#[tokio::test]
async fn test_reviews_failure_wins_over_lookup_failure() {
    let repository = repository_with_unreadable_reviews(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new().failing_reviews_for(7),
    );

    let err = repository.get_movie_details_with_reviews(MovieId(7)).await.unwrap_err();

    assert!(err.downcast_ref::<SourceError>().is_some());
    assert!(err.to_string().contains("reviews unavailable"));
}

#[tokio::test]
async fn test_details_failure_wins_over_every_other_failure() {
    let repository = repository_with_unreadable_reviews(
        FakeMovieSource::new().failing_details_for(7),
        FakeReviewSource::new().failing_reviews_for(7),
    );

    let err = repository.get_movie_details_with_reviews(MovieId(7)).await.unwrap_err();

    assert!(err.to_string().contains("details unavailable"));
}

#[tokio::test]
async fn test_details_and_reviews_are_fetched_concurrently() {
    let h = harness(
        FakeMovieSource::new()
            .with_movie(movie_dto(7, "Seven", Some(127)))
            .with_detail_delay(Duration::from_millis(200)),
        FakeReviewSource::new()
            .with_reviews(7, vec![review_dto(41, 7, "ana")])
            .with_review_delay(Duration::from_millis(200)),
    );

    let start = Instant::now();
    let combined = h.repository.get_movie_details_with_reviews(MovieId(7)).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(combined.someone_else_reviews.len(), 1);
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(380), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_observer_re_emits_on_own_review_without_refetch() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new()
            .with_reviews(7, vec![review_dto(41, 7, "ana"), review_dto(42, 7, "me")])
            .with_next_review_id(42),
    );

    let mut subscription = h.repository.observe_movie_details_with_reviews(MovieId(7));
    assert_eq!(subscription.movie_id(), MovieId(7));

    let first = subscription.next().await.unwrap().unwrap();
    assert!(first.my_review.is_none());
    assert_eq!(first.someone_else_reviews.len(), 2);

    h.repository.add_review(&draft(7), "u-1", "viewer@example.com").await.unwrap();

    let second = subscription.next().await.unwrap().unwrap();
    assert_eq!(second.my_review.as_ref().map(|r| r.review_id), Some(42));
    let others: Vec<u64> = second.someone_else_reviews.iter().map(|r| r.review_id).collect();
    assert_eq!(others, vec![41]);

    assert_eq!(h.review_source.review_calls(), 1);
    assert_eq!(h.movie_source.detail_calls(), 1);
}

#[tokio::test]
async fn test_observer_emits_error_once_then_ends() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new().failing_reviews_for(7),
    );

    let mut subscription = h.repository.observe_movie_details_with_reviews(MovieId(7));

    assert!(subscription.next().await.unwrap().is_err());
    assert!(subscription.next().await.is_none());

    h.review_store.insert(my_review_dto(1, 7).into_record()).await.unwrap();
    wait_for_no_watchers(&h.review_store).await;
    assert_eq!(h.review_store.active_watchers(), 0);
}

#[tokio::test]
async fn test_observer_follows_logout() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new(),
    );
    h.review_store.insert(my_review_dto(42, 7).into_record()).await.unwrap();

    let mut subscription = h.repository.observe_movie_details_with_reviews(MovieId(7));
    let first = subscription.next().await.unwrap().unwrap();
    assert!(first.my_review.is_some());

    h.repository.delete_user_reviews().await.unwrap();

    let second = subscription.next().await.unwrap().unwrap();
    assert!(second.my_review.is_none());
}

#[tokio::test]
async fn test_cancel_releases_store_watch() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new(),
    );

    let mut subscription = h.repository.observe_movie_details_with_reviews(MovieId(7));
    subscription.next().await.unwrap().unwrap();
    assert_eq!(h.review_store.active_watchers(), 1);

    subscription.cancel();
    assert!(!subscription.is_active());
    assert!(subscription.next().await.is_none());

    wait_for_no_watchers(&h.review_store).await;
    assert_eq!(h.review_store.active_watchers(), 0);
}

#[tokio::test]
async fn test_cancel_discards_buffered_values() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new(),
    );

    let mut subscription = h.repository.observe_movie_details_with_reviews(MovieId(7));
    tokio::time::sleep(Duration::from_millis(50)).await;
    subscription.cancel();

    assert!(subscription.next().await.is_none());
}

#[tokio::test]
async fn test_cancelled_stream_yields_nothing() {
    use futures::StreamExt;

    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(7, "Seven", Some(127))),
        FakeReviewSource::new(),
    );

    let mut subscription = h.repository.observe_movie_details_with_reviews(MovieId(7));
    tokio::time::sleep(Duration::from_millis(50)).await;
    subscription.cancel();

    assert!(StreamExt::next(&mut subscription).await.is_none());
}

#[tokio::test]
async fn test_dropping_subscription_aborts_fetch_in_flight() {
    let h = harness(
        FakeMovieSource::new()
            .with_movie(movie_dto(7, "Seven", Some(127)))
            .with_detail_delay(Duration::from_millis(200)),
        FakeReviewSource::new(),
    );

    let subscription = h.repository.observe_movie_details_with_reviews(MovieId(7));
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(subscription);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(h.movie_store.is_empty());
    assert_eq!(h.review_store.active_watchers(), 0);
}

#[tokio::test]
async fn test_add_review_stores_confirmed_review() {
    let h = harness(FakeMovieSource::new(), FakeReviewSource::new().with_next_review_id(42));

    h.repository.add_review(&draft(7), "u-1", "viewer@example.com").await.unwrap();

    let stored = h.review_store.get_by_movie_id(MovieId(7)).await.unwrap().unwrap();
    assert_eq!(stored.review_id, 42);
    assert_eq!(stored.text, "Loved it");
    assert_eq!(stored.author_email, "viewer@example.com");
}

#[tokio::test]
async fn test_rejected_review_is_not_stored() {
    let h = harness(FakeMovieSource::new(), FakeReviewSource::new().failing_add());

    let err = h
        .repository
        .add_review(&draft(7), "u-1", "viewer@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<SourceError>(), Some(SourceError::Status { status: 422, .. })));
    assert!(h.review_store.is_empty());
    assert_eq!(h.review_source.add_calls(), 1);
}

#[tokio::test]
async fn test_delete_user_reviews_clears_local_reviews() {
    let h = harness(FakeMovieSource::new(), FakeReviewSource::new());
    h.review_store
        .insert_all(vec![my_review_dto(1, 1).into_record(), my_review_dto(2, 2).into_record()])
        .await
        .unwrap();

    h.repository.delete_user_reviews().await.unwrap();
    h.repository.delete_user_reviews().await.unwrap();

    let found = h.review_store.get_by_movie_ids(&[MovieId(1), MovieId(2)]).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_sync_stores_reviews_and_warms_movies() {
    let h = harness(
        FakeMovieSource::new()
            .with_movie(movie_dto(1, "One", Some(90)))
            .with_movie(movie_dto(2, "Two", Some(95))),
        FakeReviewSource::new().with_my_reviews(vec![my_review_dto(10, 1), my_review_dto(20, 2)]),
    );

    let summary = h.repository.get_reviews_for_user("u-1").await;

    assert_eq!(
        summary,
        SyncSummary {
            reviews_synced: 2,
            movies_warmed: 2
        }
    );
    assert_eq!(h.review_store.len(), 2);
    assert_eq!(h.movie_store.fully_loaded_count(), 2);
    assert!(h.reporter.reported().is_empty());
}

#[tokio::test]
async fn test_sync_reports_remote_failure_and_writes_nothing() {
    let h = harness(FakeMovieSource::new(), FakeReviewSource::new().failing_my_reviews());

    let summary = h.repository.get_reviews_for_user("u-1").await;

    assert_eq!(summary, SyncSummary::default());
    assert!(h.review_store.is_empty());
    assert!(h.movie_store.is_empty());
    let reported = h.reporter.reported();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].operation, "get_reviews_for_user");
}

#[tokio::test]
async fn test_sync_reports_store_failure() {
    let reporter = Arc::new(CollectingReporter::new());
    let repository = MoviesRepository::new(
        Arc::new(FakeMovieSource::new()),
        Arc::new(FakeReviewSource::new().with_my_reviews(vec![my_review_dto(10, 1)])),
        Arc::new(InMemoryMovieStore::new()),
        Arc::new(ReadOnlyReviewStore),
    )
    .with_error_reporter(reporter.clone());

    let summary = repository.get_reviews_for_user("u-1").await;

    assert_eq!(summary, SyncSummary::default());
    assert_eq!(reporter.reported().len(), 1);
}

#[tokio::test]
async fn test_sync_reports_each_failed_warm_up() {
    let h = harness(
        FakeMovieSource::new()
            .with_movie(movie_dto(1, "One", Some(90)))
            .failing_details_for(2)
            .failing_details_for(3),
        FakeReviewSource::new().with_my_reviews(vec![
            my_review_dto(10, 1),
            my_review_dto(20, 2),
            my_review_dto(30, 3),
        ]),
    );

    let summary = h.repository.get_reviews_for_user("u-1").await;

    assert_eq!(summary.reviews_synced, 3);
    assert_eq!(summary.movies_warmed, 1);
    assert_eq!(h.review_store.len(), 3);
    let reported = h.reporter.take();
    assert_eq!(reported.len(), 2);
    assert!(reported.iter().all(|r| r.operation == "warm_movie_details"));
}

#[tokio::test]
async fn test_sync_without_warming_skips_details() {
    let h = harness(
        FakeMovieSource::new().with_movie(movie_dto(1, "One", Some(90))),
        FakeReviewSource::new().with_my_reviews(vec![my_review_dto(10, 1)]),
    );
    let repository = h.repository.clone().with_movie_warming(false);

    let summary = repository.get_reviews_for_user("u-1").await;

    assert_eq!(summary.reviews_synced, 1);
    assert_eq!(summary.movies_warmed, 0);
    assert_eq!(h.movie_source.detail_calls(), 0);
}
