//! Windows host adapter.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{run, run_in, HostAdapter};
use crate::error::Result;
use crate::hostenv::HostEnv;
use crate::worker::{self, WorkerSettings};

pub struct WindowsHost;

#[async_trait]
impl HostAdapter for WindowsHost {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn path_separator(&self) -> char {
        ';'
    }

    fn install_prefix(&self) -> PathBuf {
        PathBuf::from(r"C:\Program Files")
    }

    async fn install_packages(&self, names: &[&str]) -> Result<()> {
        for name in names {
            run(
                "winget",
                [
                    "install",
                    "--silent",
                    "--accept-package-agreements",
                    "--accept-source-agreements",
                    name,
                ],
            )
            .await?;
        }
        Ok(())
    }

    async fn run_installer(&self, artifact: &Path, args: &[&str]) -> Result<()> {
        let is_msi = artifact
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("msi"));
        if is_msi {
            run(
                "msiexec",
                [
                    Path::new("/i").as_os_str(),
                    artifact.as_os_str(),
                    Path::new("/qn").as_os_str(),
                ],
            )
            .await
        } else {
            let program = artifact.to_string_lossy().into_owned();
            run(&program, args.iter().copied()).await
        }
    }

    async fn run_shell(&self, command: &str) -> Result<()> {
        run("cmd", ["/C", command]).await
    }

    async fn run_shell_in(&self, dir: &Path, command: &str) -> Result<()> {
        run_in(dir, "cmd", ["/C", command]).await
    }

    async fn persist_path_entry(&self, env: &HostEnv, dir: &Path) -> Result<()> {
        // setx persists for future shells; the in-memory HostEnv covers the
        // rest of this run.
        let path = format!(
            "{};{}",
            env.path_string(self.path_separator()),
            dir.display()
        );
        run("setx", ["PATH", &path]).await
    }

    async fn register_worker_service(
        &self,
        settings: &WorkerSettings,
        _env: &HostEnv,
    ) -> Result<()> {
        let bin_path = worker::service_command(settings);
        run(
            "sc.exe",
            [
                "create",
                "RigupWorker",
                &format!("binPath= {}", bin_path),
                "start=",
                "auto",
            ],
        )
        .await
    }
}
