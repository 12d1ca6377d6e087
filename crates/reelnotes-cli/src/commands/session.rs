use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;
use movie_data_config::Session;

pub async fn run_login(user_id: String, email: String, token: Option<String>, output: &Output) -> Result<()> {
    let mut context = AppContext::load()?;

    let access_token = match token {
        Some(token) => token,
        None => rpassword::prompt_password("Access token: ")
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read access token: {}", e))?,
    };
    let access_token = access_token.trim().to_string();
    if access_token.is_empty() {
        return Err(color_eyre::eyre::eyre!("Access token cannot be empty"));
    }

    context.credentials.set_session(Session {
        user_id: user_id.clone(),
        email: email.clone(),
        access_token,
    });
    context
        .credentials
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success(format!("Logged in as {} ({})", email, user_id));
    output.info("Run 'reelnotes sync' to download your reviews.");
    Ok(())
}

/// Drop the session and every local review; nothing is sent to the server
pub async fn run_logout(output: &Output) -> Result<()> {
    let mut context = AppContext::load()?;
    let removed = context.review_store().len();

    context
        .repository
        .delete_user_reviews()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to delete local reviews: {:#}", e))?;
    context.persist()?;

    if context.credentials.session().is_none() {
        output.info("No active session");
    }
    context.credentials.clear_session();
    context
        .credentials
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success(format!("Logged out and removed {} local review(s)", removed));
    Ok(())
}
