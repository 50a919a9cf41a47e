/// Shell integration module
///
/// Handles shell detection and PATH registration so the launcher can be
/// started from anywhere.

pub mod path_installer;
pub mod path_setup;
pub mod shell_detector;
pub mod user_env;

pub use path_installer::PathInstaller;
pub use path_setup::{PathSetup, PathSetupOutcome, PathTarget, StartupAction};
pub use shell_detector::{Shell, ShellDetector};
