use serde::{Deserialize, Serialize};
use crate::movie::{MovieRecord, SearchMovieRecord};
use crate::review::{MyReviewRecord, SomeoneReview};

/// A movie merged with the viewer's own review and everyone else's
///
/// `someone_else_reviews` never contains the review whose id matches `my_review`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieWithReviews {
    pub movie: MovieRecord,
    pub my_review: Option<MyReviewRecord>,
    pub someone_else_reviews: Vec<SomeoneReview>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchMovieWithMyReview {
    pub movie: SearchMovieRecord,
    pub my_review: Option<MyReviewRecord>,
}
