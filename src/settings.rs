use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const BUCKET_LIST_FILE: &str = "bucket_list.json";
pub const ACCOUNT_NAME_MAP_FILE: &str = "account_name_map.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_statements_dir")]
    pub statements_dir: String,
}

fn default_statements_dir() -> String {
    "statements".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            statements_dir: default_statements_dir(),
        }
    }
}

impl Settings {
    /// Statements directory; relative paths resolve against the data dir.
    pub fn statements_path(&self) -> PathBuf {
        let dir = PathBuf::from(&self.statements_dir);
        if dir.is_absolute() {
            dir
        } else {
            PathBuf::from(&self.data_dir).join(dir)
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("storage")
    }

    pub fn bucket_list_path(&self) -> PathBuf {
        self.storage_path().join(BUCKET_LIST_FILE)
    }

    pub fn account_name_map_path(&self) -> PathBuf {
        self.storage_path().join(ACCOUNT_NAME_MAP_FILE)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bucketeer")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("bucketeer")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Stored settings, with the data dir replaced when one is given on the
/// command line.
pub fn resolve(data_dir: Option<&str>) -> Settings {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(dir);
    }
    settings
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
