/// Entry validation
///
/// Checks a candidate path against the kind it is being registered as.

use crate::core::Warning;
use crate::error::{Result, UrunError};
use crate::store::EntryKind;
use std::fs;
use std::path::Path;

/// Extensions that look launchable on their own; anything else only earns a warning
pub const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "ps1"];

/// Result of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub kind: EntryKind,
    pub warnings: Vec<Warning>,
}

/// Validates paths before they enter the registry
pub struct Validator;

impl Validator {
    /// Validate `path` against a declared kind
    ///
    /// # Returns
    /// * `Ok(Validated)` - Path matches `declared`, maybe with advisory warnings
    /// * `Err(UrunError)` - `PathNotFound`, `NotAFile` or `NotADirectory`
    pub fn validate(path: &Path, declared: EntryKind) -> Result<Validated> {
        let metadata = Self::metadata(path)?;

        match declared {
            EntryKind::File => {
                if !metadata.is_file() {
                    return Err(UrunError::NotAFile(path.to_path_buf()));
                }
                Ok(Validated {
                    kind: EntryKind::File,
                    warnings: Self::extension_advisory(path).into_iter().collect(),
                })
            }
            EntryKind::Folder => {
                if !metadata.is_dir() {
                    return Err(UrunError::NotADirectory(path.to_path_buf()));
                }
                Ok(Validated {
                    kind: EntryKind::Folder,
                    warnings: Vec::new(),
                })
            }
        }
    }

    /// Validate `path` and work out its kind from the filesystem
    ///
    /// Used by `update`, where the caller doesn't say what the new path is.
    pub fn validate_inferred(path: &Path) -> Result<Validated> {
        let metadata = Self::metadata(path)?;

        if metadata.is_file() {
            Ok(Validated {
                kind: EntryKind::File,
                warnings: Self::extension_advisory(path).into_iter().collect(),
            })
        } else if metadata.is_dir() {
            Ok(Validated {
                kind: EntryKind::Folder,
                warnings: Vec::new(),
            })
        } else {
            Err(UrunError::InvalidPath(path.to_path_buf()))
        }
    }

    /// True if the file extension is one of `EXECUTABLE_EXTENSIONS`
    pub fn has_executable_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                EXECUTABLE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    fn extension_advisory(path: &Path) -> Option<Warning> {
        if Self::has_executable_extension(path) {
            None
        } else {
            Some(Warning::UnusualExtension(path.to_path_buf()))
        }
    }

    // Follows symlinks, so a dangling link counts as missing
    fn metadata(path: &Path) -> Result<fs::Metadata> {
        fs::metadata(path).map_err(|_| UrunError::PathNotFound(path.to_path_buf()))
    }
}
