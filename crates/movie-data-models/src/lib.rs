pub mod movie;
pub mod review;
pub mod aggregate;

pub use movie::{MovieId, MovieRecord, SearchMovieRecord};
pub use review::{MyReviewRecord, ReviewDraft, ReviewId, SomeoneReview};
pub use aggregate::{MovieWithReviews, SearchMovieWithMyReview};
