/// Platform capabilities
///
/// The launcher only ever talks to `Platform`. Everything OS-specific lives
/// here.

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use tracing::debug;

/// What the launcher needs from the operating system
pub trait Platform {
    /// Start `program` directly (no shell) and return without waiting for it
    fn spawn_detached(&self, program: &Path, working_dir: Option<&Path>) -> io::Result<()>;

    /// Hand `path` to the OS default handler and return without waiting
    fn open_default(&self, path: &Path) -> io::Result<()>;
}

/// The real operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlatform;

impl Platform for SystemPlatform {
    fn spawn_detached(&self, program: &Path, working_dir: Option<&Path>) -> io::Result<()> {
        let mut command = Command::new(program);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }
        // The child must not share the interactive console's stdio
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        reap(child);
        Ok(())
    }

    fn open_default(&self, path: &Path) -> io::Result<()> {
        open::that_detached(path)
    }
}

// Collect the exit status off-thread so finished children don't linger
fn reap(mut child: Child) {
    let pid = child.id();
    let spawned = thread::Builder::new()
        .name(format!("reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) => debug!("Process {} exited with {}", pid, status),
            Err(e) => debug!("Could not wait on process {}: {}", pid, e),
        });
    if let Err(e) = spawned {
        debug!("No reaper thread for process {}: {}", pid, e);
    }
}

/// Test double that records calls instead of starting anything
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    pub calls: std::cell::RefCell<Vec<PlatformCall>>,
    pub fail_with: Option<io::ErrorKind>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Spawn {
        program: std::path::PathBuf,
        working_dir: Option<std::path::PathBuf>,
    },
    Open(std::path::PathBuf),
}

#[cfg(test)]
impl RecordingPlatform {
    fn result(&self) -> io::Result<()> {
        match self.fail_with {
            Some(kind) => Err(io::Error::new(kind, "refused by test platform")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
impl Platform for RecordingPlatform {
    fn spawn_detached(&self, program: &Path, working_dir: Option<&Path>) -> io::Result<()> {
        self.calls.borrow_mut().push(PlatformCall::Spawn {
            program: program.to_path_buf(),
            working_dir: working_dir.map(Path::to_path_buf),
        });
        self.result()
    }

    fn open_default(&self, path: &Path) -> io::Result<()> {
        self.calls
            .borrow_mut()
            .push(PlatformCall::Open(path.to_path_buf()));
        self.result()
    }
}
