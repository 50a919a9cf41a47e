/// PATH installer
///
/// Adds the launcher's directory to PATH by appending a marked line to the
/// user's shell startup file.

use crate::error::{Result, UrunError};
use crate::shell::Shell;
use std::fs;
use std::path::{Path, PathBuf};

/// Comment written above the PATH line so it can be found again
const MARKER: &str = "# urun PATH entry (auto-generated)";

/// PATH installer
pub struct PathInstaller {
    home: PathBuf,
}

impl PathInstaller {
    /// Create a new installer for the current user
    ///
    /// # Returns
    /// * `Ok(PathInstaller)` - New installer instance
    /// * `Err(UrunError)` - If home directory cannot be determined
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| UrunError::Config("Could not determine home directory".to_string()))?;

        Ok(Self { home })
    }

    /// Installer rooted at an explicit home directory
    pub fn with_home<P: AsRef<Path>>(home: P) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
        }
    }

    /// Register `dir` in a specific shell's RC file
    ///
    /// Does nothing if the line is already there.
    pub fn install(&self, shell: Shell, dir: &Path) -> Result<()> {
        let rc_path = shell.rc_file_in(&self.home);

        // Create parent directories if they don't exist
        if let Some(parent) = rc_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Read existing content or create new file
        let mut content = if rc_path.exists() {
            fs::read_to_string(&rc_path)?
        } else {
            String::new()
        };

        let export_line = shell.path_export_line(dir);
        if content.lines().any(|line| line.trim() == export_line) {
            return Ok(());
        }

        if !content.ends_with('\n') && !content.is_empty() {
            content.push('\n');
        }

        content.push('\n');
        content.push_str(MARKER);
        content.push('\n');
        content.push_str(&export_line);
        content.push('\n');

        fs::write(&rc_path, content)?;

        Ok(())
    }

    /// Remove a previously installed PATH line
    pub fn uninstall(&self, shell: Shell, dir: &Path) -> Result<()> {
        let rc_path = shell.rc_file_in(&self.home);
        if !rc_path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&rc_path)?;
        let export_line = shell.path_export_line(dir);

        let mut kept: Vec<&str> = content
            .lines()
            .filter(|line| line.trim() != export_line && line.trim() != MARKER)
            .collect();
        while kept.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
            kept.pop();
        }

        let mut new_content = kept.join("\n");
        if !new_content.is_empty() {
            new_content.push('\n');
        }
        fs::write(&rc_path, new_content)?;

        Ok(())
    }

    /// Check if `dir` is registered for a shell
    pub fn is_installed(&self, shell: Shell, dir: &Path) -> bool {
        let export_line = shell.path_export_line(dir);
        fs::read_to_string(shell.rc_file_in(&self.home))
            .map(|content| content.lines().any(|line| line.trim() == export_line))
            .unwrap_or(false)
    }
}
