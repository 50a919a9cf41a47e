/// Error types for urun
///
/// This module defines all possible errors that can occur in the launcher.
/// Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for urun operations
#[derive(Error, Debug)]
pub enum UrunError {
    /// Path handed to add/update does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Declared a file but the path is something else
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Declared a folder but the path is something else
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Path exists but is neither a regular file nor a directory
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Alias is empty or contains whitespace
    #[error("Invalid alias: {0:?}")]
    InvalidAlias(String),

    /// Alias collides with the reserved setup key
    #[error("Alias is reserved: {0}")]
    ReservedAlias(String),

    /// No entry under this alias
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Target alias of a rename is already taken
    #[error("Alias already exists: {0}")]
    AliasAlreadyExists(String),

    /// Registered path vanished since it was added
    #[error("Path for '{alias}' no longer exists: {}", .path.display())]
    PathMissing { alias: String, path: PathBuf },

    /// Registry document could not be written
    #[error("Could not save registry to {}: {reason}", .path.display())]
    PersistenceFailure { path: PathBuf, reason: String },

    /// OS refused to start the target
    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    /// Registry document exists but could not be parsed
    #[error("Registry is corrupted: {0}")]
    CorruptRegistry(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for urun operations
pub type Result<T> = std::result::Result<T, UrunError>;

/// Convert UrunError to a user-friendly error message
impl UrunError {
    pub fn user_message(&self) -> String {
        match self {
            UrunError::PathNotFound(path) => format!(
                "Error: The path '{}' does not exist. Please provide a valid path.",
                path.display()
            ),
            UrunError::NotAFile(path) => format!(
                "Error: The path '{}' is not a file. Please provide the path to a file.",
                path.display()
            ),
            UrunError::NotADirectory(path) => format!(
                "Error: The path '{}' is not a directory. Please provide the path to a folder.",
                path.display()
            ),
            UrunError::InvalidPath(path) => format!(
                "Error: The path '{}' is neither a file nor a directory.",
                path.display()
            ),
            UrunError::InvalidAlias(alias) => {
                format!("Error: '{}' is not a usable alias. Aliases are single words.", alias)
            }
            UrunError::ReservedAlias(alias) => {
                format!("Error: '{}' is reserved by Urun. Please choose a different name.", alias)
            }
            UrunError::AliasNotFound(alias) => format!(
                "Error: Alias '{}' not found. Use 'list' to see available entries.",
                alias
            ),
            UrunError::AliasAlreadyExists(alias) => format!(
                "Error: Alias '{}' already exists. Please choose a different name.",
                alias
            ),
            UrunError::PathMissing { alias, path } => format!(
                "Error: Path for '{}' ('{}') no longer exists. Consider updating or removing it.",
                alias,
                path.display()
            ),
            UrunError::PersistenceFailure { path, reason } => format!(
                "Error: Could not save data to {}. Reason: {}",
                path.display(),
                reason
            ),
            UrunError::LaunchFailed(reason) => format!(
                "Error launching: {}. Please ensure the path is correct and you have permission to access it.",
                reason
            ),
            UrunError::CorruptRegistry(reason) => format!(
                "Warning: the registry file is corrupted ({}). Starting with an empty list.",
                reason
            ),
            UrunError::Config(msg) => format!("Configuration issue: {}", msg),
            UrunError::Io(e) => format!("File system error. Check permissions. Details: {}", e),
            UrunError::Serialization(e) => format!("Data format error: {}", e),
        }
    }
}
