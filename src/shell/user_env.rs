// Per-user PATH on Windows
//
// Programs started from Win+R or cmd take PATH from the registry, not from a
// shell startup file. The user's half of it lives under HKCU\Environment.

use crate::error::{Result, UrunError};
use std::path::Path;

const SEPARATOR: char = ';';

/// `current` with `dir` appended, or `None` if it is already listed
pub fn with_dir(current: &str, dir: &Path) -> Option<String> {
    let dir = dir.display().to_string();
    if entries(current).any(|entry| same_dir(entry, &dir)) {
        return None;
    }

    let mut updated = current.trim_end_matches(SEPARATOR).to_string();
    if !updated.is_empty() {
        updated.push(SEPARATOR);
    }
    updated.push_str(&dir);
    Some(updated)
}

/// `current` without `dir`, or `None` if it wasn't listed
pub fn without_dir(current: &str, dir: &Path) -> Option<String> {
    let dir = dir.display().to_string();
    if !entries(current).any(|entry| same_dir(entry, &dir)) {
        return None;
    }

    let kept: Vec<&str> = entries(current)
        .filter(|entry| !same_dir(entry, &dir))
        .collect();
    Some(kept.join(&SEPARATOR.to_string()))
}

fn entries(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

// Windows paths compare case-insensitively, trailing separator or not
fn same_dir(entry: &str, dir: &str) -> bool {
    entry
        .trim_end_matches(&['\\', '/'][..])
        .eq_ignore_ascii_case(dir.trim_end_matches(&['\\', '/'][..]))
}

/// Add `dir` to the user PATH
///
/// # Returns
/// * `Ok(true)` - PATH was changed
/// * `Ok(false)` - `dir` was already listed
pub fn register(dir: &Path) -> Result<bool> {
    let current = registry::read().map_err(unavailable)?;
    match with_dir(&current, dir) {
        Some(updated) => {
            registry::write(&updated).map_err(unavailable)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Remove `dir` from the user PATH; `Ok(false)` if it wasn't there
pub fn unregister(dir: &Path) -> Result<bool> {
    let current = registry::read().map_err(unavailable)?;
    match without_dir(&current, dir) {
        Some(updated) => {
            registry::write(&updated).map_err(unavailable)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn unavailable(e: std::io::Error) -> UrunError {
    UrunError::Config(format!("Could not update the user PATH: {}", e))
}

#[cfg(windows)]
mod registry {
    use std::io;
    use winreg::enums::{RegType, HKEY_CURRENT_USER};
    use winreg::{RegKey, RegValue};

    const ENVIRONMENT: &str = "Environment";
    const PATH: &str = "Path";

    pub fn read() -> io::Result<String> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (key, _) = hkcu.create_subkey(ENVIRONMENT)?;
        match key.get_value::<String, _>(PATH) {
            Ok(value) => Ok(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    // REG_EXPAND_SZ so entries like %USERPROFILE%\bin keep working
    pub fn write(value: &str) -> io::Result<()> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (key, _) = hkcu.create_subkey(ENVIRONMENT)?;
        let bytes = value
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect();
        key.set_raw_value(
            PATH,
            &RegValue {
                bytes,
                vtype: RegType::REG_EXPAND_SZ,
            },
        )
    }
}

#[cfg(not(windows))]
mod registry {
    use std::io;

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "the user environment registry only exists on Windows",
        )
    }

    pub fn read() -> io::Result<String> {
        Err(unsupported())
    }

    pub fn write(_value: &str) -> io::Result<()> {
        Err(unsupported())
    }
}
