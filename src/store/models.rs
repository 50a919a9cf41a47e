/// Data models for registry entities
///
/// `Alias`, `Entry` and friends are the typed in-memory view. `RegistryDocument`
/// is the flat JSON shape that lives on disk.

use crate::error::{Result, UrunError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// On-disk key that remembers whether PATH setup was already offered
pub const PATH_SETUP_KEY: &str = "path_set_attempted";

/// A normalized (trimmed, lower-cased) alias
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alias(String);

impl Alias {
    /// Normalize raw user input into an alias
    ///
    /// Fails with `InvalidAlias` for empty input or input containing whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(UrunError::InvalidAlias(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the key the setup flag occupies on disk
    pub fn is_reserved(&self) -> bool {
        self.0 == PATH_SETUP_KEY
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an entry was registered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    /// Best-effort kind for a path that was not validated (e.g. loaded from disk)
    pub fn infer(path: &Path) -> Self {
        if path.is_dir() {
            EntryKind::Folder
        } else {
            EntryKind::File
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        };
        write!(f, "{}", s)
    }
}

/// A registered alias and the path it launches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub alias: Alias,
    pub target: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn listing(&self) -> Listing {
        Listing {
            alias: self.alias.clone(),
            target: self.target.clone(),
            status: EntryStatus::of(&self.target),
        }
    }
}

/// Read-time classification of a path, independent of the stored kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    File,
    Folder,
    Missing,
}

impl EntryStatus {
    pub fn of(path: &Path) -> Self {
        if path.is_dir() {
            EntryStatus::Folder
        } else if !path.exists() {
            EntryStatus::Missing
        } else {
            EntryStatus::File
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryStatus::File => "File",
            EntryStatus::Folder => "Folder",
            EntryStatus::Missing => "MISSING",
        };
        write!(f, "{}", s)
    }
}

/// One row of `list` output or of an ambiguous match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub alias: Alias,
    pub target: PathBuf,
    pub status: EntryStatus,
}

/// Flat JSON document: alias keys mapped to path strings, plus the setup flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(
        rename = "path_set_attempted",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub path_set_attempted: bool,

    #[serde(flatten)]
    pub entries: BTreeMap<String, PathBuf>,
}
