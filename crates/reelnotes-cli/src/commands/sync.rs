use super::context::AppContext;
use super::sync_ui::SyncUI;
use crate::output::Output;
use chrono::Utc;
use color_eyre::Result;
use movie_data_core::CollectingReporter;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

pub async fn run_sync(output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let reporter = Arc::new(CollectingReporter::new());
    let mut context = AppContext::load()?.with_error_reporter(reporter.clone());
    let session = context.require_session()?;

    let ui = SyncUI::new(output.is_human() && !output.is_quiet());
    ui.set_message(format!("Syncing reviews for {}...", session.email));

    let start = Instant::now();
    let summary = context.repository.get_reviews_for_user(&session.user_id).await;
    let duration = start.elapsed();
    ui.finish();

    let failures = reporter.take();
    if failures.is_empty() {
        context.credentials.set_last_review_sync(Utc::now());
        context
            .credentials
            .save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save sync timestamp: {}", e))?;
    }
    context.persist()?;

    if output.is_human() {
        for failure in &failures {
            output.warn(format!("{}: {}", failure.operation, failure.message));
        }
        let message = format!(
            "Sync completed: {} reviews stored, {} movies cached in {:?}",
            summary.reviews_synced, summary.movies_warmed, duration
        );
        output.info(format!(
            "Local cache: {} movies ({} with full details), {} reviews",
            context.movie_store().len(),
            context.movie_store().fully_loaded_count(),
            context.review_store().len()
        ));
        if failures.is_empty() {
            output.success(message);
        } else {
            output.warn(format!("{} ({} failures)", message, failures.len()));
        }
    } else {
        let failures: Vec<_> = failures
            .iter()
            .map(|f| json!({ "operation": f.operation, "message": f.message }))
            .collect();
        output.json(&json!({
            "success": failures.is_empty(),
            "reviews_synced": summary.reviews_synced,
            "movies_warmed": summary.movies_warmed,
            "failures": failures,
            "duration_seconds": duration.as_secs_f64(),
        }));
    }
    Ok(())
}
