use anyhow::{Context, Result};
use chatline_runtime_config::{parse_config, ChatlineConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/chatline/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("chatline"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load config from `explicit` or the canonical path. A missing canonical
/// file yields defaults; a missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<ChatlineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Ok(path) if path.exists() => path,
            Ok(_) => return Ok(ChatlineConfig::default()),
            Err(e) => {
                tracing::debug!("no config directory: {e:#}");
                return Ok(ChatlineConfig::default());
            }
        },
    };
    read_config(&path)
}

fn read_config(path: &Path) -> Result<ChatlineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn show_config(config: &ChatlineConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to serialize config")?;
    print!("{rendered}");
    Ok(())
}
