use super::context::AppContext;
use super::display;
use crate::output::Output;
use color_eyre::Result;
use serde_json::json;

pub async fn run_search(query: &str, page: u32, output: &Output) -> Result<()> {
    tracing::debug!(query, page, "Search command started");
    let context = AppContext::load()?;

    let results = context
        .repository
        .search_movies_with_reviews(query, page)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Search for '{}' failed: {:#}", query, e))?;
    context.persist()?;

    if output.is_human() {
        if results.is_empty() {
            output.info(format!("No movies found for '{}'", query));
        } else {
            output.block(display::search_table(&results));
        }
    } else {
        output.json(&json!({
            "query": query,
            "page": page,
            "results": results,
        }));
    }
    Ok(())
}
