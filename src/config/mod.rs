mod types;

pub use types::*;

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./rangegate.toml",
        "./config.toml",
        "~/.config/rangegate/config.toml",
        "/etc/rangegate/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let base = Url::parse(&config.server.public_base_url).with_context(|| {
        format!(
            "Invalid public_base_url '{}'",
            config.server.public_base_url
        )
    })?;
    if base.cannot_be_a_base() {
        anyhow::bail!(
            "public_base_url '{}' must be an http(s) URL",
            config.server.public_base_url
        );
    }

    let buffer_size = config.streaming.buffer_size;
    if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&buffer_size) {
        anyhow::bail!(
            "streaming.buffer_size must be between {} and {} bytes, got {}",
            MIN_BUFFER_SIZE,
            MAX_BUFFER_SIZE,
            buffer_size
        );
    }

    match config.store.backend {
        StoreBackend::Filesystem => {
            if !config.store.filesystem.root.is_dir() {
                tracing::warn!(
                    "Filesystem store root does not exist: {:?}",
                    config.store.filesystem.root
                );
            }
        }
        StoreBackend::Drive => {
            if !config.store.drive.has_credentials() {
                anyhow::bail!("Drive store needs an access_token or an api_key");
            }
            if config.store.drive.connect_timeout_secs == 0 {
                anyhow::bail!("store.drive.connect_timeout_secs cannot be 0");
            }
        }
    }

    Ok(())
}
