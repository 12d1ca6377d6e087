use crate::dto::{MovieDto, MyReviewDto, ReviewDto};
use crate::error::SourceError;
use movie_data_models::{MovieId, ReviewDraft};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Serialize)]
struct NewReviewBody<'a> {
    movie_id: u64,
    rating: u8,
    content: &'a str,
    author_id: &'a str,
    author_email: &'a str,
}

fn with_auth(request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
    let request = request.header("Accept", "application/json");
    match access_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Send a request and decode a JSON body, mapping non-2xx answers to `SourceError::Status`
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SourceError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!("API request failed: {} - {}", status, body);
        return Err(SourceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}

pub async fn search_movies(
    client: &Client,
    base_url: &str,
    access_token: Option<&str>,
    query: &str,
    page: u32,
) -> Result<Vec<MovieDto>, SourceError> {
    let url = format!(
        "{}/search/movie?query={}&page={}",
        base_url,
        urlencoding::encode(query),
        page
    );
    debug!("Searching movies: {}", url);

    let page: Page<MovieDto> = send_json(with_auth(client.get(&url), access_token)).await?;
    Ok(page.results)
}

pub async fn get_movie(
    client: &Client,
    base_url: &str,
    access_token: Option<&str>,
    id: MovieId,
) -> Result<MovieDto, SourceError> {
    let url = format!("{}/movie/{}", base_url, id);
    debug!("Fetching movie details: {}", url);
    send_json(with_auth(client.get(&url), access_token)).await
}

pub async fn get_movie_reviews(
    client: &Client,
    base_url: &str,
    access_token: Option<&str>,
    id: MovieId,
) -> Result<Vec<ReviewDto>, SourceError> {
    let url = format!("{}/movie/{}/reviews", base_url, id);
    debug!("Fetching movie reviews: {}", url);

    let page: Page<ReviewDto> = send_json(with_auth(client.get(&url), access_token)).await?;
    Ok(page.results)
}

pub async fn get_user_reviews(
    client: &Client,
    base_url: &str,
    access_token: &str,
    user_id: &str,
) -> Result<Vec<MyReviewDto>, SourceError> {
    let url = format!("{}/users/{}/reviews", base_url, urlencoding::encode(user_id));
    debug!("Fetching user reviews: {}", url);

    let page: Page<MyReviewDto> = send_json(with_auth(client.get(&url), Some(access_token))).await?;
    Ok(page.results)
}

pub async fn post_review(
    client: &Client,
    base_url: &str,
    access_token: &str,
    draft: &ReviewDraft,
    author_id: &str,
    author_email: &str,
) -> Result<MyReviewDto, SourceError> {
    let url = format!("{}/reviews", base_url);
    let body = NewReviewBody {
        movie_id: draft.movie_id.0,
        rating: draft.rating,
        content: &draft.text,
        author_id,
        author_email,
    };
    debug!("Posting review for movie {}", draft.movie_id);

    send_json(with_auth(client.post(&url).json(&body), Some(access_token))).await
}
