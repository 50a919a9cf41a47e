// One-time PATH setup
//
// Offered at startup until the user has answered once; the answer is kept in
// the registry's setup flag. `setpath` runs the same flow on demand.

use crate::core::Registry;
use crate::error::{Result, UrunError};
use crate::shell::{user_env, PathInstaller, Shell, ShellDetector};
use crate::store::RegistryStore;
use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where the PATH entry gets written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTarget {
    /// A marked export line in the shell's startup file
    Shell(Shell),
    /// The Windows per-user PATH (HKCU\Environment), seen by Win+R and cmd
    UserEnvironment,
}

impl PathTarget {
    /// Target for this machine: the user environment on Windows, otherwise
    /// the detected shell
    pub fn detect() -> Option<Self> {
        if cfg!(windows) {
            Some(PathTarget::UserEnvironment)
        } else {
            ShellDetector::detect().ok().map(PathTarget::Shell)
        }
    }
}

impl fmt::Display for PathTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathTarget::Shell(shell) => write!(f, "{}", shell),
            PathTarget::UserEnvironment => write!(f, "user"),
        }
    }
}

/// What startup should do about PATH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupAction {
    /// Directory is on PATH already
    Nothing,
    /// Never asked before; offer setup
    Offer,
    /// Asked before and it's still missing; show the manual guide
    ShowGuide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSetupOutcome {
    AlreadyOnPath,
    Registered(PathTarget),
    Declined,
}

/// True if `dir` is one of the entries of a PATH-style variable
pub fn dir_on_path(dir: &Path, path_var: Option<&OsStr>) -> bool {
    path_var
        .map(|value| env::split_paths(value).any(|entry| entry == dir))
        .unwrap_or(false)
}

/// Directory of the running executable
pub fn current_exe_dir() -> Result<PathBuf> {
    let exe = env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| UrunError::Config("Executable has no parent directory".to_string()))
}

pub fn startup_action(on_path: bool, already_attempted: bool) -> StartupAction {
    match (on_path, already_attempted) {
        (true, _) => StartupAction::Nothing,
        (false, false) => StartupAction::Offer,
        (false, true) => StartupAction::ShowGuide,
    }
}

/// Drives PATH registration and keeps the setup flag current
pub struct PathSetup {
    installer: PathInstaller,
    target: Option<PathTarget>,
}

impl PathSetup {
    /// Setup for the current user and this machine's PATH target
    pub fn new() -> Result<Self> {
        Ok(Self {
            installer: PathInstaller::new()?,
            target: PathTarget::detect(),
        })
    }

    pub fn with_parts(installer: PathInstaller, target: Option<PathTarget>) -> Self {
        Self { installer, target }
    }

    pub fn target(&self) -> Option<PathTarget> {
        self.target
    }

    /// Offer to put `exe_dir` on PATH
    ///
    /// `confirm` is only asked when there is something to do. The setup flag
    /// is set whatever happens so startup won't ask again.
    pub fn run<S, F>(
        &self,
        registry: &mut Registry<S>,
        exe_dir: &Path,
        path_var: Option<&OsStr>,
        confirm: F,
    ) -> Result<PathSetupOutcome>
    where
        S: RegistryStore,
        F: FnOnce(&Path) -> bool,
    {
        let result = self.register(exe_dir, path_var, confirm);
        registry.mark_path_setup_attempted();
        result
    }

    fn register<F>(&self, exe_dir: &Path, path_var: Option<&OsStr>, confirm: F) -> Result<PathSetupOutcome>
    where
        F: FnOnce(&Path) -> bool,
    {
        if dir_on_path(exe_dir, path_var) {
            info!("'{}' is already in your user's PATH.", exe_dir.display());
            info!("No action needed. You can launch Urun from anywhere.");
            return Ok(PathSetupOutcome::AlreadyOnPath);
        }

        if !confirm(exe_dir) {
            info!("Adding to PATH cancelled by user.");
            return Ok(PathSetupOutcome::Declined);
        }

        let target = self.target.ok_or_else(|| {
            UrunError::Config(
                "Could not detect shell. Please set $SHELL environment variable.".to_string(),
            )
        })?;

        match target {
            PathTarget::Shell(shell) => self.installer.install(shell, exe_dir)?,
            PathTarget::UserEnvironment => {
                if !user_env::register(exe_dir)? {
                    info!("'{}' is already in your user's PATH.", exe_dir.display());
                    return Ok(PathSetupOutcome::AlreadyOnPath);
                }
            }
        }
        info!(
            "Successfully added '{}' to your {} PATH.",
            exe_dir.display(),
            target
        );
        match target {
            PathTarget::Shell(_) => info!("Please open a NEW terminal for changes to take effect."),
            PathTarget::UserEnvironment => info!(
                "Please open a NEW Command Prompt or Run dialog (Win+R) for changes to take effect."
            ),
        }
        Ok(PathSetupOutcome::Registered(target))
    }

    /// Undo a previous registration
    pub fn remove(&self, exe_dir: &Path) -> Result<PathTarget> {
        let target = self.target.ok_or_else(|| {
            UrunError::Config("Could not detect shell.".to_string())
        })?;

        let was_registered = match target {
            PathTarget::Shell(shell) => {
                let installed = self.installer.is_installed(shell, exe_dir);
                self.installer.uninstall(shell, exe_dir)?;
                installed
            }
            PathTarget::UserEnvironment => user_env::unregister(exe_dir)?,
        };

        if was_registered {
            info!("Removed '{}' from your {} PATH.", exe_dir.display(), target);
        } else {
            warn!("'{}' was not registered in your {} PATH.", exe_dir.display(), target);
        }
        Ok(target)
    }
}

/// Manual instructions for when automatic setup didn't stick
pub fn troubleshooting_guide(exe_dir: &Path, target: Option<PathTarget>) -> String {
    let mut guide = String::new();
    guide.push_str("\n--- Urun PATH Setup Guide ---\n");
    guide.push_str("Urun's directory is not in your PATH, or the automatic setup failed.\n");
    guide.push_str("This means your shell cannot find 'urun' when you type it.\n\n");
    guide.push_str(&format!("1. Copy the path to Urun's folder: '{}'\n", exe_dir.display()));

    match target {
        Some(PathTarget::Shell(shell)) => {
            let rc = shell
                .rc_file_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "your shell startup file".to_string());
            guide.push_str(&format!("2. Open {} in a text editor.\n", rc));
            guide.push_str(&format!(
                "3. Add this line at the end: {}\n",
                shell.path_export_line(exe_dir)
            ));
        }
        Some(PathTarget::UserEnvironment) | None => {
            guide.push_str("2. Press Win+R, type 'sysdm.cpl' and press Enter.\n");
            guide.push_str("3. Open the 'Advanced' tab and click 'Environment Variables...'.\n");
            guide.push_str("4. Under 'User variables', select 'Path' and click 'Edit...'.\n");
            guide.push_str("5. Click 'New', paste the path from step 1 and confirm with 'OK'.\n");
            guide.push_str("   Elsewhere, add the folder to PATH in your shell's startup file.\n");
        }
    }

    guide.push_str("\nIMPORTANT: close ALL open terminals afterwards and start a new one.\n");
    guide.push_str("---------------------------\n");
    guide
}
