//! Host OS abstraction layer.
//!
//! The `HostAdapter` trait is the seam between the OS-independent
//! provisioning routine and the platform it runs on: package manager,
//! installer invocation, PATH persistence and CI worker autostart all go
//! through it. One implementation per supported OS; the current host's
//! adapter is selected at runtime.
//!
//! # Adding an OS
//!
//! 1. Create a new module (e.g., `freebsd.rs`)
//! 2. Implement the `HostAdapter` trait
//! 3. Register it in `by_name`

pub mod linux;
pub mod macos;
pub mod windows;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Result, RigupError};
use crate::hostenv::HostEnv;
use crate::worker::WorkerSettings;

pub use linux::LinuxHost;
pub use macos::MacosHost;
pub use windows::WindowsHost;

/// Platform primitives used by the provisioning routine.
///
/// Everything here blocks the provisioning flow until the underlying
/// subprocess finishes; a non-zero exit from any primitive aborts the run.
#[async_trait]
pub trait HostAdapter: Send + Sync {
    /// OS name, matching `std::env::consts::OS`.
    fn name(&self) -> &'static str;

    /// Separator used when rendering PATH strings for this OS.
    fn path_separator(&self) -> char;

    /// Conventional prefix archives are unpacked under.
    fn install_prefix(&self) -> PathBuf;

    /// Install packages through the OS package manager.
    async fn install_packages(&self, names: &[&str]) -> Result<()>;

    /// Run a downloaded installer artifact (run-file, PKG, DMG, MSI, EXE).
    async fn run_installer(&self, artifact: &Path, args: &[&str]) -> Result<()>;

    /// Run one shell command.
    async fn run_shell(&self, command: &str) -> Result<()>;

    /// Run one shell command with `dir` as working directory.
    async fn run_shell_in(&self, dir: &Path, command: &str) -> Result<()>;

    /// Make `dir` reachable from future shells: symlinks under
    /// `/usr/local/bin` on Unix, a `setx PATH` on Windows.
    async fn persist_path_entry(&self, env: &HostEnv, dir: &Path) -> Result<()>;

    /// Register the CI worker for autostart (cron / launchd / service).
    async fn register_worker_service(&self, worker: &WorkerSettings, env: &HostEnv)
        -> Result<()>;
}

/// Adapter for the OS this process is running on.
pub fn detect() -> Result<Box<dyn HostAdapter>> {
    by_name(std::env::consts::OS).ok_or_else(|| {
        RigupError::Config(format!("unsupported host OS: {}", std::env::consts::OS))
    })
}

/// Adapter by OS name. Used by `detect` and by tests.
pub fn by_name(name: &str) -> Option<Box<dyn HostAdapter>> {
    match name {
        "linux" => Some(Box::new(LinuxHost)),
        "macos" => Some(Box::new(MacosHost)),
        "windows" => Some(Box::new(WindowsHost)),
        _ => None,
    }
}

/// Run a subprocess, propagating a non-zero exit as a fatal error.
///
/// Stdio is inherited so installer output stays visible; provisioning runs
/// are interactively supervised.
pub(crate) async fn run<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = tokio::process::Command::new(program);
    command.args(args);
    tracing::debug!("running {:?}", command.as_std());

    let status = command.status().await?;
    if status.success() {
        Ok(())
    } else {
        Err(RigupError::Installer {
            program: program.to_string(),
            code: status.code().unwrap_or(-1),
        })
    }
}

/// Run a subprocess with a working directory.
pub(crate) async fn run_in<I, S>(dir: &Path, program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = tokio::process::Command::new(program);
    command.args(args).current_dir(dir);
    tracing::debug!("running {:?} in {}", command.as_std(), dir.display());

    let status = command.status().await?;
    if status.success() {
        Ok(())
    } else {
        Err(RigupError::Installer {
            program: program.to_string(),
            code: status.code().unwrap_or(-1),
        })
    }
}

/// Symlink every executable in `dir` into `into`, skipping names that
/// already resolve there. Mirrors how build hosts expose unpacked tool
/// archives without editing shell profiles.
#[cfg(unix)]
pub(crate) fn link_executables(dir: &Path, into: &Path) -> Result<()> {
    use crate::hostenv::is_executable;

    std::fs::create_dir_all(into)?;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let target = entry.path();
        if !is_executable(&target) {
            continue;
        }
        let link = into.join(entry.file_name());
        if link.exists() {
            tracing::debug!("link already exists: {}", link.display());
            continue;
        }
        tracing::info!("linking {} -> {}", link.display(), target.display());
        std::os::unix::fs::symlink(&target, &link)?;
    }
    Ok(())
}

// The Unix adapters are never selected on Windows hosts.
#[cfg(not(unix))]
pub(crate) fn link_executables(_dir: &Path, _into: &Path) -> Result<()> {
    Ok(())
}
