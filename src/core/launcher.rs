// Launches resolved entries
//
// Fire-and-forget: nothing here ever waits for the launched target to exit.

use crate::error::{Result, UrunError};
use crate::platform::{Platform, SystemPlatform};
use crate::store::{Entry, EntryKind};
use std::path::Path;
use tracing::info;

// Files with this extension are started as their own process
const DIRECT_EXEC_EXTENSION: &str = "exe";

/// How the target was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Spawned as a process with its own directory as cwd
    Spawned,
    /// Handed to the OS default handler
    Opened,
}

pub struct Launcher<P: Platform = SystemPlatform> {
    platform: P,
}

impl Default for Launcher<SystemPlatform> {
    fn default() -> Self {
        Self::new(SystemPlatform)
    }
}

impl<P: Platform> Launcher<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Start an entry's target
    ///
    /// Fails with `PathMissing` if the target disappeared, and with
    /// `LaunchFailed` if the OS refuses. Neither touches the registry.
    pub fn launch(&self, entry: &Entry) -> Result<LaunchMode> {
        let target = &entry.target;
        if !target.exists() {
            return Err(UrunError::PathMissing {
                alias: entry.alias.to_string(),
                path: target.clone(),
            });
        }

        info!("Launching '{}' from '{}'...", entry.alias, target.display());

        let mode = if Self::runs_directly(entry) {
            // Games and similar tools resolve assets relative to their own folder
            let working_dir = target.parent().filter(|p| !p.as_os_str().is_empty());
            self.platform
                .spawn_detached(target, working_dir)
                .map_err(|e| UrunError::LaunchFailed(format!("'{}': {}", entry.alias, e)))?;
            LaunchMode::Spawned
        } else {
            self.platform
                .open_default(target)
                .map_err(|e| UrunError::LaunchFailed(format!("'{}': {}", entry.alias, e)))?;
            LaunchMode::Opened
        };

        info!(
            "'{}' launched successfully. You can continue using Urun.",
            entry.alias
        );
        Ok(mode)
    }

    fn runs_directly(entry: &Entry) -> bool {
        entry.kind == EntryKind::File
            && entry.target.is_file()
            && has_direct_exec_extension(&entry.target)
    }
}

fn has_direct_exec_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(DIRECT_EXEC_EXTENSION))
        .unwrap_or(false)
}
