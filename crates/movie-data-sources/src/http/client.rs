use crate::dto::{MovieDto, MyReviewDto, ReviewDto};
use crate::error::SourceError;
use crate::http::api;
use crate::traits::{RemoteMovieSource, RemoteReviewSource};
use async_trait::async_trait;
use movie_data_config::ApiConfig;
use movie_data_models::{MovieId, ReviewDraft};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// HTTP implementation of both remote sources
#[derive(Clone)]
pub struct ApiClient {
    client: Arc<Client>,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reelnotes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        })
    }

    pub fn from_config(config: &ApiConfig, access_token: Option<String>) -> Result<Self, SourceError> {
        Self::new(
            config.base_url.clone(),
            access_token,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn access_token(&self) -> Result<&str, SourceError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| SourceError::Unauthorized("no access token stored, run `reelnotes login`".to_string()))
    }
}

#[async_trait]
impl RemoteMovieSource for ApiClient {
    async fn search_movies(&self, query: &str, page: u32) -> Result<Vec<MovieDto>, SourceError> {
        api::search_movies(&self.client, &self.base_url, self.access_token.as_deref(), query, page).await
    }

    async fn get_movie_details(&self, id: MovieId) -> Result<MovieDto, SourceError> {
        api::get_movie(&self.client, &self.base_url, self.access_token.as_deref(), id).await
    }
}

#[async_trait]
impl RemoteReviewSource for ApiClient {
    async fn get_movie_reviews(&self, id: MovieId) -> Result<Vec<ReviewDto>, SourceError> {
        api::get_movie_reviews(&self.client, &self.base_url, self.access_token.as_deref(), id).await
    }

    async fn get_my_reviews(&self, user_id: &str) -> Result<Vec<MyReviewDto>, SourceError> {
        let access_token = self.access_token()?;
        api::get_user_reviews(&self.client, &self.base_url, access_token, user_id).await
    }

    async fn add_review(
        &self,
        draft: &ReviewDraft,
        author_id: &str,
        author_email: &str,
    ) -> Result<MyReviewDto, SourceError> {
        let access_token = self.access_token()?;
        api::post_review(&self.client, &self.base_url, access_token, draft, author_id, author_email).await
    }
}
