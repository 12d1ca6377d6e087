use super::context::AppContext;
use super::display;
use crate::output::Output;
use color_eyre::Result;
use movie_data_models::MovieId;
use serde_json::json;

/// Print the movie every time the combined view changes, until Ctrl-C
pub async fn run_watch(id: u64, output: &Output) -> Result<()> {
    let context = AppContext::load()?;
    let mut subscription = context.repository.observe_movie_details_with_reviews(MovieId(id));
    output.info(format!("Watching movie {} (Ctrl-C to stop)", id));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Interrupted, stopping watch");
                break;
            }
            item = subscription.next() => match item {
                Some(Ok(combined)) => {
                    if output.is_human() {
                        output.block(display::movie_details(&combined));
                    } else {
                        output.json(&json!(combined));
                    }
                }
                Some(Err(e)) => output.error(format!("Failed to load movie {}: {:#}", id, e)),
                None => break,
            },
        }
    }

    subscription.cancel();
    context.persist()?;
    Ok(())
}
