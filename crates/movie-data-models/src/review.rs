use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::MovieId;

/// Server-assigned review identifier
pub type ReviewId = u64;

/// The signed-in user's own review, as confirmed by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MyReviewRecord {
    pub review_id: ReviewId,
    pub movie_id: MovieId,
    pub author_id: String,
    pub author_email: String,
    pub rating: u8, // 1-10
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A review by any user, only ever read from the remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SomeoneReview {
    pub review_id: ReviewId,
    pub movie_id: MovieId,
    pub author_name: String,
    pub rating: Option<u8>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A review being composed, before the server assigns an id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewDraft {
    pub movie_id: MovieId,
    pub rating: u8,
    pub text: String,
}
