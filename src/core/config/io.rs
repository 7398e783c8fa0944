use crate::core::config::data::{path_display, Settings};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The settings store could not be reached.
///
/// Never fatal: loads fall back to defaults and saves surface a notice.
#[derive(Debug)]
pub enum StoreUnavailable {
    /// Failed to read the settings file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file exists but is not valid TOML for [`Settings`].
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The settings could not be rendered as TOML.
    Serialize(toml::ser::Error),

    /// Failed to write or atomically replace the settings file.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The store is offline or its background task died.
    Offline(String),
}

impl fmt::Display for StoreUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreUnavailable::Read { path, source } => {
                write!(f, "Failed to read settings at {}: {}", path_display(path), source)
            }
            StoreUnavailable::Parse { path, source } => {
                write!(f, "Failed to parse settings at {}: {}", path_display(path), source)
            }
            StoreUnavailable::Serialize(source) => {
                write!(f, "Failed to serialize settings: {source}")
            }
            StoreUnavailable::Write { path, source } => {
                write!(f, "Failed to write settings to {}: {}", path_display(path), source)
            }
            StoreUnavailable::Offline(reason) => write!(f, "Settings store unavailable: {reason}"),
        }
    }
}

impl StdError for StoreUnavailable {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreUnavailable::Read { source, .. } => Some(source),
            StoreUnavailable::Parse { source, .. } => Some(source),
            StoreUnavailable::Serialize(source) => Some(source),
            StoreUnavailable::Write { source, .. } => Some(source),
            StoreUnavailable::Offline(_) => None,
        }
    }
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file is not an error: it yields the environment-seeded
    /// first-run settings.
    pub fn load_from_path(path: &Path) -> Result<Settings, StoreUnavailable> {
        if !path.exists() {
            return Ok(Settings::from_env());
        }

        let contents = fs::read_to_string(path).map_err(|source| StoreUnavailable::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| StoreUnavailable::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the file at `path` with these settings.
    ///
    /// The document is written to a temp file in the same directory and then
    /// renamed over the target, so readers never observe a torn file.
    pub fn save_to_path(&self, path: &Path) -> Result<(), StoreUnavailable> {
        let write_err = |source: std::io::Error| StoreUnavailable::Write {
            path: path.to_path_buf(),
            source,
        };

        let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let contents = toml::to_string_pretty(self).map_err(StoreUnavailable::Serialize)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(write_err)?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(path)
            .map_err(|err| write_err(err.error))?;
        Ok(())
    }

    /// Default location of the settings file.
    pub fn default_path() -> Result<PathBuf, StoreUnavailable> {
        let proj_dirs = ProjectDirs::from("org", "localhub", "localhub").ok_or_else(|| {
            StoreUnavailable::Offline("could not determine the config directory".to_string())
        })?;
        Ok(proj_dirs.config_dir().join("settings.toml"))
    }
}
