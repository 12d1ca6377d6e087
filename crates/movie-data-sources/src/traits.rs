use async_trait::async_trait;
use movie_data_models::{MovieId, ReviewDraft};
use crate::dto::{MovieDto, MyReviewDto, ReviewDto};
use crate::error::SourceError;

/// Remote movie metadata (search and detail endpoints)
#[async_trait]
pub trait RemoteMovieSource: Send + Sync {
    async fn search_movies(&self, query: &str, page: u32) -> Result<Vec<MovieDto>, SourceError>;
    async fn get_movie_details(&self, id: MovieId) -> Result<MovieDto, SourceError>;
}

/// Remote review endpoints
#[async_trait]
pub trait RemoteReviewSource: Send + Sync {
    /// All reviews of a movie, including the viewer's own if it exists
    async fn get_movie_reviews(&self, id: MovieId) -> Result<Vec<ReviewDto>, SourceError>;
    async fn get_my_reviews(&self, user_id: &str) -> Result<Vec<MyReviewDto>, SourceError>;
    async fn add_review(
        &self,
        draft: &ReviewDraft,
        author_id: &str,
        author_email: &str,
    ) -> Result<MyReviewDto, SourceError>;
}
