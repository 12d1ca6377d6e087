use movie_data_models::{
    MovieRecord, MovieWithReviews, MyReviewRecord, SearchMovieRecord, SearchMovieWithMyReview, SomeoneReview,
};
use std::collections::HashMap;

/// Combine a movie with the viewer's review and everyone else's
///
/// The remote review list includes the viewer's own review; it is dropped from
/// `someone_else_reviews` when its id matches `my_review`.
pub fn merge_movie_with_reviews(
    movie: MovieRecord,
    my_review: Option<MyReviewRecord>,
    all_reviews: Vec<SomeoneReview>,
) -> MovieWithReviews {
    let own_id = my_review.as_ref().map(|r| r.review_id);
    let someone_else_reviews = all_reviews
        .into_iter()
        .filter(|review| Some(review.review_id) != own_id)
        .collect();

    MovieWithReviews {
        movie,
        my_review,
        someone_else_reviews,
    }
}

/// Pair each search hit with the viewer's review of it, keeping search order
pub fn zip_search_with_my_reviews(
    movies: Vec<SearchMovieRecord>,
    my_reviews: Vec<MyReviewRecord>,
) -> Vec<SearchMovieWithMyReview> {
    let by_movie: HashMap<_, _> = my_reviews.into_iter().map(|r| (r.movie_id, r)).collect();

    movies
        .into_iter()
        .map(|movie| {
            let my_review = by_movie.get(&movie.id).cloned();
            SearchMovieWithMyReview { movie, my_review }
        })
        .collect()
}
