pub mod traits;
pub mod dto;
pub mod http;
pub mod error;

pub use traits::{RemoteMovieSource, RemoteReviewSource};
pub use dto::{MovieDto, MyReviewDto, ReviewDto};
pub use http::ApiClient;
pub use error::SourceError;
