//! Debian-family Linux host adapter.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{link_executables, run, run_in, HostAdapter};
use crate::error::Result;
use crate::hostenv::HostEnv;
use crate::worker::{self, WorkerSettings};

pub struct LinuxHost;

#[async_trait]
impl HostAdapter for LinuxHost {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn install_prefix(&self) -> PathBuf {
        PathBuf::from("/opt")
    }

    async fn install_packages(&self, names: &[&str]) -> Result<()> {
        run("apt-get", ["update", "-q"]).await?;
        let mut args = vec!["install", "-qy"];
        args.extend_from_slice(names);
        run("apt-get", args).await
    }

    async fn run_installer(&self, artifact: &Path, args: &[&str]) -> Result<()> {
        // Vendor run-files and shell installers; .deb goes through dpkg.
        let is_deb = artifact
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("deb"));
        if is_deb {
            run("dpkg", [Path::new("-i").as_os_str(), artifact.as_os_str()]).await
        } else {
            let mut all = vec![artifact.as_os_str().to_os_string()];
            all.extend(args.iter().map(|a| a.into()));
            run("sh", all).await
        }
    }

    async fn run_shell(&self, command: &str) -> Result<()> {
        run("sh", ["-c", command]).await
    }

    async fn run_shell_in(&self, dir: &Path, command: &str) -> Result<()> {
        run_in(dir, "sh", ["-c", command]).await
    }

    async fn persist_path_entry(&self, _env: &HostEnv, dir: &Path) -> Result<()> {
        link_executables(dir, Path::new("/usr/local/bin"))
    }

    async fn register_worker_service(
        &self,
        settings: &WorkerSettings,
        env: &HostEnv,
    ) -> Result<()> {
        let line = worker::cron_line(settings, env, self.path_separator());
        let command = format!("(crontab -l 2>/dev/null; echo '{}') | crontab -", line);
        self.run_shell(&command).await
    }
}
