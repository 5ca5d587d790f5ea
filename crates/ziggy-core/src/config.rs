use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ZiggyError};
use crate::platform::PlatformKey;

const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_HTML_CATALOG_URL: &str = "https://ziglang.org/download/";
const DEFAULT_JSON_CATALOG_URL: &str = "https://ziglang.org/download/index.json";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONNECT_RETRIES: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    #[default]
    Html,
    Json,
}

impl CatalogFormat {
    pub fn default_url(self) -> &'static str {
        match self {
            Self::Html => DEFAULT_HTML_CATALOG_URL,
            Self::Json => DEFAULT_JSON_CATALOG_URL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    link_path: Option<PathBuf>,
    platform: Option<String>,
    catalog_url: Option<String>,
    catalog_format: Option<CatalogFormat>,
    timeout_secs: Option<u64>,
    connect_retries: Option<u32>,
    activate_on_upgrade: Option<bool>,
}

/// Values that win over both the config file and the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_root: Option<PathBuf>,
    pub link_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    pub fn from_env() -> Self {
        Self {
            store_root: std::env::var_os("ZIGGY_HOME")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            link_path: std::env::var_os("ZIGGY_LINK")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZiggyConfig {
    pub store_root: PathBuf,
    pub link_path: PathBuf,
    pub platform: PlatformKey,
    pub catalog_url: String,
    pub catalog_format: CatalogFormat,
    pub timeout: Duration,
    pub connect_retries: u32,
    pub activate_on_upgrade: bool,
}

impl ZiggyConfig {
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let home = home_dir()?;
        let store_root = overrides
            .store_root
            .clone()
            .unwrap_or_else(|| default_store_root(&home));

        let config_path = store_root.join(CONFIG_FILE_NAME);
        let raw = match fs::read_to_string(&config_path) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(ZiggyError::io(
                    format!("failed to read config file {}", config_path.display()),
                    err,
                ));
            }
        };
        if raw.is_some() {
            debug!(path = %config_path.display(), "loaded config file");
        }

        Self::from_parts(&home, store_root, raw.as_deref(), overrides)
    }

    pub fn from_parts(
        home: &Path,
        store_root: PathBuf,
        config_file: Option<&str>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let file = match config_file {
            Some(raw) => toml::from_str::<ConfigFile>(raw)
                .map_err(|err| ZiggyError::Config(format!("{CONFIG_FILE_NAME}: {err}")))?,
            None => ConfigFile::default(),
        };

        let store_root = absolute_path(store_root)?;
        let platform = match file.platform.as_deref() {
            Some(value) => value.parse::<PlatformKey>()?,
            None => PlatformKey::detect()?,
        };

        let link_path = overrides
            .link_path
            .clone()
            .or(file.link_path)
            .unwrap_or_else(|| default_link_path(home, platform));
        let link_path = absolute_path(link_path)?;

        let catalog_format = file.catalog_format.unwrap_or_default();
        let catalog_url = file
            .catalog_url
            .unwrap_or_else(|| catalog_format.default_url().to_string());
        let parsed = Url::parse(&catalog_url)
            .map_err(|err| ZiggyError::Config(format!("catalog_url {catalog_url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(ZiggyError::Config(format!(
                "catalog_url must be an http(s) URL: {catalog_url}"
            )));
        }

        let timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ZiggyError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            store_root,
            link_path,
            platform,
            catalog_url,
            catalog_format,
            timeout: Duration::from_secs(timeout_secs),
            connect_retries: file.connect_retries.unwrap_or(DEFAULT_CONNECT_RETRIES),
            activate_on_upgrade: file.activate_on_upgrade.unwrap_or(false),
        })
    }
}

fn home_dir() -> Result<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| ZiggyError::Config(format!("{var} is not set; cannot resolve store root")))
}

// Link targets are written exactly as given, so both ends must be absolute.
fn absolute_path(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    std::path::absolute(&path)
        .map_err(|err| ZiggyError::io(format!("failed to resolve {}", path.display()), err))
}

pub fn default_store_root(home: &Path) -> PathBuf {
    home.join(".ziggy")
}

fn default_link_path(home: &Path, platform: PlatformKey) -> PathBuf {
    home.join(".local")
        .join("bin")
        .join(platform.executable_name())
}
