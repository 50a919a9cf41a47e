/// Launcher configuration
///
/// Resolves where the registry document and the diagnostic log live.

use crate::error::{Result, UrunError};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the per-user data directory when set
pub const DATA_DIR_ENV: &str = "URUN_DATA_DIR";

const APP_DIR_NAME: &str = "UrunLauncher";
const REGISTRY_FILE_NAME: &str = "launcher_data.json";
const LOG_FILE_NAME: &str = "launcher.log";

/// File locations used by one launcher session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub registry_file: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    /// Build a config rooted at `data_dir`
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            registry_file: data_dir.join(REGISTRY_FILE_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }

    /// Resolve the config from the environment
    ///
    /// `URUN_DATA_DIR` wins; otherwise the per-user local data directory
    /// (e.g. `%LOCALAPPDATA%\UrunLauncher`, `~/.local/share/UrunLauncher`).
    pub fn from_env() -> Result<Self> {
        Self::resolve(std::env::var_os(DATA_DIR_ENV))
    }

    fn resolve(override_dir: Option<OsString>) -> Result<Self> {
        if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
            return Ok(Self::with_data_dir(PathBuf::from(dir)));
        }

        let base = dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| {
                UrunError::Config("Could not determine a per-user data directory".to_string())
            })?;

        Ok(Self::with_data_dir(base.join(APP_DIR_NAME)))
    }

    /// Create the data directory if it doesn't exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
