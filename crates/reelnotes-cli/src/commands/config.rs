use super::display::mask_string;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use movie_data_config::{Config, CredentialStore, PathManager};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(&path_manager, full, output),
        crate::ConfigCommands::Init { base_url, force } => init_config(&path_manager, base_url, force, output),
    }
}

fn section(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn flag(enabled: bool) -> String {
    if enabled {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn show_config(path_manager: &PathManager, full: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Defaults are in use. Run 'reelnotes config init' to write them to disk.");
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut credentials = CredentialStore::new(path_manager.credentials_file());
    credentials
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let token = credentials.get_access_token().cloned().unwrap_or_default();
    let token_display = if full { token.clone() } else { mask_string(&token) };
    let snapshot_file = path_manager.cache_snapshot_file(&config.cache.snapshot_file);

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "api": {
                "base_url": config.api.base_url,
                "timeout_seconds": config.api.timeout_seconds,
            },
            "cache": {
                "persist": config.cache.persist,
                "snapshot_file": snapshot_file.display().to_string(),
            },
            "sync": {
                "warm_movie_details": config.sync.warm_movie_details,
            },
            "session": {
                "user_id": credentials.get_user_id(),
                "email": credentials.get_user_email(),
                "access_token": token_display,
                "last_review_sync": credentials.get_last_review_sync().map(|t| t.to_rfc3339()),
            },
        }));
        return Ok(());
    }

    let mut info = section("Files");
    info.add_row(vec![Cell::new("Config"), Cell::new(config_file.display())]);
    info.add_row(vec![Cell::new("Credentials"), Cell::new(path_manager.credentials_file().display())]);
    info.add_row(vec![Cell::new("Cache snapshot"), Cell::new(snapshot_file.display())]);
    output.block(info);

    let mut api = section("API");
    api.add_row(vec![Cell::new("Base URL"), Cell::new(&config.api.base_url)]);
    api.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.api.timeout_seconds))]);
    output.block(api);

    let mut behaviour = section("Cache & sync");
    behaviour.add_row(vec![Cell::new("Persist cache"), Cell::new(flag(config.cache.persist))]);
    behaviour.add_row(vec![
        Cell::new("Warm movie details on sync"),
        Cell::new(flag(config.sync.warm_movie_details)),
    ]);
    output.block(behaviour);

    let mut session = section("Session");
    match credentials.session() {
        Some(s) => {
            session.add_row(vec![Cell::new("User"), Cell::new(&s.user_id)]);
            session.add_row(vec![Cell::new("Email"), Cell::new(&s.email)]);
            session.add_row(vec![Cell::new("Access token"), Cell::new(token_display)]);
            let last_sync = credentials
                .get_last_review_sync()
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "never".to_string());
            session.add_row(vec![Cell::new("Last review sync"), Cell::new(last_sync)]);
        }
        None => {
            session.add_row(vec![Cell::new("Not logged in".bright_black().to_string())]);
        }
    }
    output.block(session);
    Ok(())
}

fn init_config(path_manager: &PathManager, base_url: Option<String>, force: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.warn(format!("Configuration already exists at: {}", config_file.display()));
        output.info("Use --force to overwrite it.");
        return Ok(());
    }

    let mut config = Config::default();
    if let Some(base_url) = base_url {
        config.api.base_url = base_url;
    }
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;

    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration written to {}", config_file.display()));
    Ok(())
}
