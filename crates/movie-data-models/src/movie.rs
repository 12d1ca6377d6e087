use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Movie identifier shared by the remote API and both local stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MovieId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Cached movie entity
///
/// Search results create stub records (`fully_loaded == false`). A successful
/// detail fetch replaces the stub with a full record under the same id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub overview: String,
    pub genres: String, // Comma separated, as displayed
    pub rating: f32,    // Average vote, 0-10
    pub poster_url: Option<String>,
    pub duration_minutes: u32,
    pub fully_loaded: bool,
}

impl MovieRecord {
    pub fn is_fully_loaded(&self) -> bool {
        self.fully_loaded
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Project the record to the subset used by search listings
    pub fn to_search_record(&self) -> SearchMovieRecord {
        SearchMovieRecord {
            id: self.id,
            title: self.title.clone(),
            release_year: self.release_year(),
            rating: self.rating,
            poster_url: self.poster_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchMovieRecord {
    pub id: MovieId,
    pub title: String,
    pub release_year: Option<i32>,
    pub rating: f32,
    pub poster_url: Option<String>,
}
