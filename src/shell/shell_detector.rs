/// Shell detection logic
///
/// Detects which shell the user is running and where its startup file lives,
/// so the launcher's directory can be added to that shell's PATH.

use crate::error::{Result, UrunError};
use std::env;
use std::path::{Path, PathBuf};

/// Supported shells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

impl Shell {
    /// Get the shell name as a string
    pub fn name(&self) -> &str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
            Shell::PowerShell => "powershell",
        }
    }

    /// Get the RC file path for this shell under the user's home directory
    pub fn rc_file_path(&self) -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            UrunError::Config("Could not determine home directory".to_string())
        })?;
        Ok(self.rc_file_in(&home))
    }

    /// RC file path relative to an explicit home directory
    pub fn rc_file_in(&self, home: &Path) -> PathBuf {
        match self {
            Shell::Bash => {
                // Prefer .bashrc, fallback to .bash_profile
                let bashrc = home.join(".bashrc");
                if bashrc.exists() || !home.join(".bash_profile").exists() {
                    bashrc
                } else {
                    home.join(".bash_profile")
                }
            }
            Shell::Zsh => home.join(".zshrc"),
            Shell::Fish => home.join(".config/fish/config.fish"),
            Shell::PowerShell => {
                home.join("Documents/PowerShell/Microsoft.PowerShell_profile.ps1")
            }
        }
    }

    /// Line that appends `dir` to PATH in this shell's syntax
    pub fn path_export_line(&self, dir: &Path) -> String {
        match self {
            Shell::Bash | Shell::Zsh => {
                format!("export PATH=\"$PATH:{}\"", dir.display())
            }
            Shell::Fish => {
                format!("set -gx PATH $PATH \"{}\"", dir.display())
            }
            Shell::PowerShell => {
                format!("$env:Path += \";{}\"", dir.display())
            }
        }
    }
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shell detector
pub struct ShellDetector;

impl ShellDetector {
    /// Detect the current shell
    ///
    /// Attempts to detect the shell from environment variables.
    ///
    /// # Returns
    /// * `Ok(Shell)` - The detected shell
    /// * `Err(UrunError)` - If shell cannot be detected
    pub fn detect() -> Result<Shell> {
        Self::detect_from(env::var("SHELL").ok(), env::var_os("PSModulePath").is_some())
    }

    fn detect_from(shell_var: Option<String>, has_ps_module_path: bool) -> Result<Shell> {
        if let Some(shell_path) = shell_var {
            let shell_name = Path::new(&shell_path)
                .file_stem()
                .and_then(|name| name.to_str())
                .unwrap_or("")
                .to_lowercase();

            return match shell_name.as_str() {
                "bash" => Ok(Shell::Bash),
                "zsh" => Ok(Shell::Zsh),
                "fish" => Ok(Shell::Fish),
                "pwsh" | "powershell" => Ok(Shell::PowerShell),
                _ => Err(UrunError::Config(format!(
                    "Unsupported shell: {}",
                    shell_name
                ))),
            };
        }

        // Windows consoles don't set $SHELL
        if has_ps_module_path {
            return Ok(Shell::PowerShell);
        }

        Err(UrunError::Config(
            "Could not detect shell. Please set $SHELL environment variable.".to_string(),
        ))
    }
}
