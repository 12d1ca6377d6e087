use super::context::AppContext;
use super::display;
use crate::output::Output;
use color_eyre::Result;
use movie_data_models::MovieId;
use serde_json::json;

pub async fn run_movie(id: u64, output: &Output) -> Result<()> {
    let context = AppContext::load()?;

    let combined = context
        .repository
        .get_movie_details_with_reviews(MovieId(id))
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load movie {}: {:#}", id, e))?;
    context.persist()?;

    if output.is_human() {
        output.block(display::movie_details(&combined));
    } else {
        output.json(&json!(combined));
    }
    Ok(())
}
