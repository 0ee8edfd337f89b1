use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::errors::{AppError, AppResult};

const CONFIG: &str = include_str!("../.config/config.json5");

pub static PROJECT_NAME: LazyLock<String> =
    LazyLock::new(|| env!("CARGO_CRATE_NAME").to_uppercase().to_string());
pub static DATA_FOLDER: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    env::var(format!("{}_DATA", &*PROJECT_NAME))
        .ok()
        .map(PathBuf::from)
});
pub static CONFIG_FOLDER: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    env::var(format!("{}_CONFIG", &*PROJECT_NAME))
        .ok()
        .map(PathBuf::from)
});

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    /// Manifest location relative to the project directory.
    #[serde(default)]
    pub manifest_path: PathBuf,
    #[serde(default)]
    pub catalog: Catalog,
}

impl Config {
    pub fn new() -> AppResult<Self> {
        Self::load(&get_config_dir(), &get_data_dir())
    }

    /// Layers the config files found in `config_dir` over the embedded defaults.
    pub fn load(config_dir: &Path, data_dir: &Path) -> AppResult<Self> {
        let default_config: Config = json5::from_str(CONFIG)
            .map_err(|e| AppError::Unknown(format!("embedded config is invalid: {e}")))?;

        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .set_default(
                "manifest_path",
                default_config.manifest_path.to_string_lossy().to_string(),
            )?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            let source = config::File::from(path.clone())
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if path.exists() {
                debug!("Loading config from {}", path.display());
                found_config = true
            }
        }
        if !found_config {
            debug!("No configuration file found, using the built-in catalog");
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;

        // A user catalog replaces the built-in one as a whole rather than merging entry by entry.
        if cfg.catalog.is_empty() {
            cfg.catalog = default_config.catalog;
        }

        Ok(cfg)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pkg-toggle", env!("CARGO_PKG_NAME"))
}
