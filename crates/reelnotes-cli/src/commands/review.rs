use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;
use movie_data_models::{MovieId, ReviewDraft};
use serde_json::json;

pub async fn run_review(id: u64, rating: u8, text: String, output: &Output) -> Result<()> {
    let context = AppContext::load()?;
    let session = context.require_session()?;

    let draft = ReviewDraft {
        movie_id: MovieId(id),
        rating,
        text,
    };
    context
        .repository
        .add_review(&draft, &session.user_id, &session.email)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to submit review for movie {}: {:#}", id, e))?;
    context.persist()?;

    if output.is_human() {
        output.success(format!("Review for movie {} saved ({}/10)", id, rating));
    } else {
        output.json(&json!({
            "success": true,
            "movie_id": id,
            "rating": rating,
        }));
    }
    Ok(())
}
