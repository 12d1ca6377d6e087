use chrono::{DateTime, NaiveDate, Utc};
use movie_data_models::{MovieId, MovieRecord, MyReviewRecord, ReviewId, SomeoneReview};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreDto {
    pub id: u64,
    pub name: String,
}

/// Movie as returned by both the search and the detail endpoints
///
/// Search results usually omit `runtime` and `genres`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDto {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>, // "YYYY-MM-DD", sometimes ""
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreDto>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

impl MovieDto {
    fn parse_release_date(&self) -> Option<NaiveDate> {
        self.release_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    fn into_record(self, fully_loaded: bool) -> MovieRecord {
        let release_date = self.parse_release_date();
        let genres = self
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        MovieRecord {
            id: MovieId(self.id),
            title: self.title,
            release_date,
            overview: self.overview.unwrap_or_default(),
            genres,
            rating: self.vote_average,
            poster_url: self.poster_url,
            duration_minutes: self.runtime.unwrap_or(0),
            fully_loaded,
        }
    }

    /// Record built from a search hit
    ///
    /// Counts as fully loaded only when the API happened to include a runtime.
    pub fn into_stub_record(self) -> MovieRecord {
        let fully_loaded = self.runtime.map_or(false, |r| r > 0);
        self.into_record(fully_loaded)
    }

    /// Record built from the detail endpoint
    pub fn into_full_record(self) -> MovieRecord {
        self.into_record(true)
    }
}

/// Review of a movie by any user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewDto {
    pub id: ReviewId,
    pub movie_id: u64,
    pub author: String,
    #[serde(default)]
    pub rating: Option<u8>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewDto {
    pub fn into_someone_review(self) -> SomeoneReview {
        SomeoneReview {
            review_id: self.id,
            movie_id: MovieId(self.movie_id),
            author_name: self.author,
            rating: self.rating,
            text: self.content,
            created_at: self.created_at,
        }
    }
}

/// Review authored by the signed-in user, with server-assigned id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MyReviewDto {
    pub id: ReviewId,
    pub movie_id: u64,
    pub author_id: String,
    pub author_email: String,
    pub rating: u8,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MyReviewDto {
    pub fn into_record(self) -> MyReviewRecord {
        MyReviewRecord {
            review_id: self.id,
            movie_id: MovieId(self.movie_id),
            author_id: self.author_id,
            author_email: self.author_email,
            rating: self.rating,
            text: self.content,
            created_at: self.created_at,
        }
    }
}
