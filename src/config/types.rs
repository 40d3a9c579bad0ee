use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rangegate_store::{DriveOptions, DriveStore, FsStore, RemoteStore};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL clients use to reach this server; stream URLs are built from it.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    9999
}
fn default_public_base_url() -> String {
    "http://localhost:9999".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: default_public_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// Size in bytes of the copy buffer used for each transfer.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

/// Smallest accepted `buffer_size`.
pub const MIN_BUFFER_SIZE: usize = 1024;
/// Largest accepted `buffer_size`.
pub const MAX_BUFFER_SIZE: usize = 8 * 1024 * 1024;

fn default_buffer_size() -> usize {
    20 * 1024
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Filesystem,
    Drive,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Filesystem => write!(f, "filesystem"),
            StoreBackend::Drive => write!(f, "drive"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default)]
    pub filesystem: FilesystemConfig,

    #[serde(default)]
    pub drive: DriveConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesystemConfig {
    #[serde(default = "default_fs_root")]
    pub root: PathBuf,
}

fn default_fs_root() -> PathBuf {
    PathBuf::from("./media")
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_fs_root(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,

    /// OAuth access token (sent as `Authorization: Bearer`)
    #[serde(default)]
    pub access_token: Option<String>,

    /// API key for publicly shared files
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_drive_api_base() -> String {
    rangegate_store::drive::DEFAULT_API_BASE.to_string()
}
fn default_connect_timeout() -> u64 {
    10
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: default_drive_api_base(),
            access_token: None,
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl DriveConfig {
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.access_token) || present(&self.api_key)
    }
}

impl StoreConfig {
    /// Construct the configured backend.
    pub fn build(&self) -> rangegate_common::Result<Arc<dyn RemoteStore>> {
        match self.backend {
            StoreBackend::Filesystem => Ok(Arc::new(FsStore::new(self.filesystem.root.clone()))),
            StoreBackend::Drive => {
                let store = DriveStore::new(DriveOptions {
                    api_base: self.drive.api_base.clone(),
                    access_token: self.drive.access_token.clone(),
                    api_key: self.drive.api_key.clone(),
                    connect_timeout: Duration::from_secs(self.drive.connect_timeout_secs),
                })?;
                Ok(Arc::new(store))
            }
        }
    }
}
