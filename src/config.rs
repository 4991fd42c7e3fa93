use crate::errors::PathClipError;
use crate::formatter::OutputFormat;
use crate::validator::DEFAULT_MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const CONFIG_ENV_VAR: &str = "PATHCLIP_CONFIG";
const APP_DIR: &str = "pathclip";
const CONFIG_FILE: &str = "config.json";

/// Persisted user state. Fields missing from the file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub file_paths: Vec<PathBuf>,
    pub output_format: OutputFormat,
    pub include_headers: bool,
    pub max_file_size: u64,
    pub exclude_patterns: Vec<String>,
    pub tokenizer_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_paths: Vec::new(),
            output_format: OutputFormat::Plain,
            include_headers: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            exclude_patterns: Vec::new(),
            tokenizer_model: "gpt-4o".to_owned(),
        }
    }
}

impl Config {
    /// Appends entries not already in the list. Returns the ones added, in
    /// order.
    pub fn add_paths(&mut self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut known: HashSet<PathBuf> = self.file_paths.iter().cloned().collect();
        let mut added = Vec::new();
        for path in paths {
            if known.insert(path.clone()) {
                self.file_paths.push(path.clone());
                added.push(path.clone());
            }
        }
        added
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    /// `$PATHCLIP_CONFIG` if set, else `<config dir>/pathclip/config.json`.
    pub fn default_location() -> Result<Self, PathClipError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Ok(ConfigStore::new(path));
        }
        let dir = dirs::config_dir().ok_or_else(|| {
            PathClipError::ConfigError("cannot determine the user configuration directory".to_owned())
        })?;
        Ok(ConfigStore::new(dir.join(APP_DIR).join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(&self) -> Result<Config, PathClipError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(PathClipError::ConfigError(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let config: Config = serde_json::from_str(&text).map_err(|e| {
            PathClipError::ConfigError(format!("malformed config {}: {}", self.path.display(), e))
        })?;
        debug!(
            "Loaded config from {} ({} paths)",
            self.path.display(),
            config.file_paths.len()
        );
        Ok(config)
    }

    /// Writes to a temporary file beside the target, then renames it over
    /// the old config.
    pub fn save(&self, config: &Config) -> Result<(), PathClipError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| {
            PathClipError::ConfigError(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let json = serde_json::to_string_pretty(config)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| {
            PathClipError::ConfigError(format!("cannot write {}: {}", self.path.display(), e.error))
        })?;

        info!("Saved config to {}", self.path.display());
        Ok(())
    }
}
