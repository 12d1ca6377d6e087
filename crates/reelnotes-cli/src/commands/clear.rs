use crate::output::Output;
use color_eyre::Result;
use movie_data_config::{Config, PathManager};
use movie_data_core::CacheStorage;
use std::fs;

pub async fn run_clear(all: bool, cache: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_cache(&path_manager, output)?;
        clear_credentials(&path_manager, output)?;
        output.success("Cache and credentials cleared");
        return Ok(());
    }

    if cache {
        clear_cache(&path_manager, output)?;
    }
    if credentials {
        clear_credentials(&path_manager, output)?;
    }

    if !cache && !credentials {
        output.warn("No clear option specified. Use --cache, --credentials, or --all");
        output.info("\nExample: reelnotes clear --cache");
    }
    Ok(())
}

fn clear_cache(path_manager: &PathManager, output: &Output) -> Result<()> {
    let config = Config::load_or_default(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config: {}", e))?;
    let storage = CacheStorage::new(&path_manager.cache_snapshot_file(&config.cache.snapshot_file));

    let size = storage.size().unwrap_or(0);
    let removed = storage
        .clear()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to remove cache at {}: {}", storage.path().display(), e))?;
    if removed {
        output.success(format!("Cleared cache: {} ({} bytes)", storage.path().display(), size));
    } else {
        output.info("No cache found to clear");
    }
    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e)
        })?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }
    Ok(())
}
