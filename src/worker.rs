//! CI worker registration.
//!
//! `install` writes the worker's config file and registers it for
//! autostart through the host adapter: a cron `@reboot` entry on Linux, a
//! launchd agent on macOS, a Windows service. A worker whose config file is
//! already in place is never re-registered.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigupError};
use crate::host::HostAdapter;
use crate::hostenv::HostEnv;
use crate::installer::{ensure_installed, InstallOutcome};

pub const WORKER_CONFIG_FILENAME: &str = "worker.yaml";

/// Worker settings from the `worker:` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerSettings {
    pub master_host: String,
    pub master_port: u16,
    pub name: String,
    /// Shared secret between worker and master. The config file carrying it
    /// is written mode 0600 on Unix.
    pub password: String,
    /// Worker base directory; defaults to `~/rigup-worker`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    /// Command launched inside the base directory to start the worker.
    #[serde(default = "default_command")]
    pub command: String,
}

fn default_command() -> String {
    "buildbot-worker start .".to_string()
}

/// On-disk worker config, consumed by the worker process itself.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WorkerFile {
    master: String,
    name: String,
    password: String,
}

pub fn worker_dir(settings: &WorkerSettings) -> Result<PathBuf> {
    match &settings.base_dir {
        Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).into_owned())),
        None => dirs::home_dir()
            .map(|home| home.join("rigup-worker"))
            .ok_or_else(|| RigupError::Config("cannot resolve home directory".to_string())),
    }
}

pub fn config_path(settings: &WorkerSettings) -> Result<PathBuf> {
    Ok(worker_dir(settings)?.join(WORKER_CONFIG_FILENAME))
}

fn render_config(settings: &WorkerSettings) -> Result<String> {
    let file = WorkerFile {
        master: format!("{}:{}", settings.master_host, settings.master_port),
        name: settings.name.clone(),
        password: settings.password.clone(),
    };
    Ok(serde_yaml::to_string(&file)?)
}

/// Cron entry starting the worker at boot with the provisioned PATH.
///
/// The `PATH=` assignment must prefix the worker command itself; placed
/// before the `cd` it would only apply to the builtin and the worker would
/// resolve against cron's minimal default PATH.
pub fn cron_line(settings: &WorkerSettings, env: &HostEnv, separator: char) -> String {
    let dir = worker_dir(settings)
        .map(|d| d.display().to_string())
        .unwrap_or_else(|_| ".".to_string());
    format!(
        "@reboot cd {} && PATH={} {}",
        dir,
        env.path_string(separator),
        settings.command
    )
}

/// Launchd agent plist starting the worker at login.
pub fn launchd_plist(settings: &WorkerSettings, env: &HostEnv, separator: char) -> String {
    let dir = worker_dir(settings)
        .map(|d| d.display().to_string())
        .unwrap_or_else(|_| ".".to_string());
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>com.rigup.worker</string>
    <key>ProgramArguments</key>
    <array>
        <string>/bin/sh</string>
        <string>-c</string>
        <string>cd {dir} && {command}</string>
    </array>
    <key>EnvironmentVariables</key>
    <dict>
        <key>PATH</key>
        <string>{path}</string>
    </dict>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        dir = dir,
        command = settings.command,
        path = env.path_string(separator),
    )
}

/// Command line handed to `sc.exe create` on Windows.
pub fn service_command(settings: &WorkerSettings) -> String {
    let dir = worker_dir(settings)
        .map(|d| d.display().to_string())
        .unwrap_or_else(|_| ".".to_string());
    format!("cmd /C \"cd /D {} && {}\"", dir, settings.command)
}

/// Register the worker on this host unless it is already registered.
pub async fn install(
    adapter: &dyn HostAdapter,
    env: &HostEnv,
    settings: &WorkerSettings,
) -> Result<InstallOutcome> {
    let config = config_path(settings)?;
    ensure_installed(
        "ci-worker",
        || Ok(config.exists()),
        || async {
            let dir = worker_dir(settings)?;
            std::fs::create_dir_all(&dir)?;

            let rendered = render_config(settings)?;
            std::fs::write(&config, rendered)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mut perms = std::fs::metadata(&config)?.permissions();
                perms.set_mode(0o600);
                std::fs::set_permissions(&config, perms)?;
            }

            adapter.register_worker_service(settings, env).await
        },
    )
    .await
}

/// Start the worker process once, in its base directory.
pub async fn start(adapter: &dyn HostAdapter, settings: &WorkerSettings) -> Result<()> {
    let dir = worker_dir(settings)?;
    if !config_path(settings)?.exists() {
        return Err(RigupError::Config(format!(
            "worker is not installed in {}. Run 'rigup worker install' first.",
            dir.display()
        )));
    }
    adapter.run_shell_in(&dir, &settings.command).await
}
