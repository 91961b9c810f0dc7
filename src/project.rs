use crate::error::{FlowError, Result};
use crate::fileutil::clean_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_DIR: &str = ".ddev";
pub const PROJECT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    MariaDb,
    MySql,
    Postgres,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct DatabaseConfig {
    #[serde(rename = "type", default)]
    pub db_type: DatabaseType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// Per-project state shared by the settings and import workflows.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    #[serde(skip)]
    pub app_root: PathBuf,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub app_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub composer_root: String,
    #[serde(skip)]
    pub site_settings_file: PathBuf,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub docroot: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upload_dirs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_environment: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ports: BTreeMap<String, u16>,
}

impl ProjectDescriptor {
    pub fn new<P: AsRef<Path>>(app_root: P, app_type: &str) -> Self {
        let app_root = clean_path(app_root.as_ref());
        let name = app_root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        Self {
            app_root,
            name,
            app_type: app_type.to_string(),
            composer_root: String::new(),
            site_settings_file: PathBuf::new(),
            database: DatabaseConfig::default(),
            docroot: String::new(),
            upload_dirs: Vec::new(),
            web_environment: Vec::new(),
            ports: BTreeMap::new(),
        }
    }

    pub fn config_path(app_root: &Path) -> PathBuf {
        app_root.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILE)
    }

    pub fn load(app_root: &Path) -> Result<Self> {
        let path = Self::config_path(app_root);
        let content = fs::read_to_string(&path).map_err(|e| FlowError::io("read", &path, e))?;
        let mut descriptor: Self =
            serde_yaml::from_str(&content).map_err(|e| FlowError::Config {
                path: path.clone(),
                message: e.to_string(),
            })?;

        descriptor.app_root = clean_path(app_root);
        if descriptor.name.is_empty() {
            descriptor.name = Self::new(app_root, "").name;
        }
        Ok(descriptor)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path(&self.app_root);
        let content = serde_yaml::to_string(self).map_err(|e| FlowError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FlowError::io("create directory", parent, e))?;
        }
        fs::write(&path, content).map_err(|e| FlowError::io("write", &path, e))
    }

    /// `AppRoot/ComposerRoot`, where the framework tree lives.
    pub fn composer_root_path(&self) -> PathBuf {
        clean_path(&self.app_root.join(&self.composer_root))
    }

    pub fn abs_docroot(&self) -> PathBuf {
        clean_path(&self.app_root.join(&self.docroot))
    }

    /// Maps a docroot-relative upload directory to its absolute host path.
    pub fn host_upload_dir_full_path(&self, upload_dir: &str) -> PathBuf {
        clean_path(&self.abs_docroot().join(upload_dir))
    }

    pub fn default_upload_dir(&self) -> Option<&str> {
        self.upload_dirs.first().map(String::as_str)
    }
}
