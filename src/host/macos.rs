//! macOS host adapter.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{link_executables, run, run_in, HostAdapter};
use crate::error::{Result, RigupError};
use crate::hostenv::HostEnv;
use crate::worker::{self, WorkerSettings};

const DMG_MOUNTPOINT: &str = "/tmp/rigup-dmg";

pub struct MacosHost;

#[async_trait]
impl HostAdapter for MacosHost {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn install_prefix(&self) -> PathBuf {
        PathBuf::from("/opt")
    }

    async fn install_packages(&self, names: &[&str]) -> Result<()> {
        let mut args = vec!["install"];
        args.extend_from_slice(names);
        run("port", args).await
    }

    async fn run_installer(&self, artifact: &Path, args: &[&str]) -> Result<()> {
        let ext = artifact
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pkg" => install_pkg(artifact).await,
            "dmg" => install_dmg(artifact).await,
            _ => {
                let mut all = vec![artifact.as_os_str().to_os_string()];
                all.extend(args.iter().map(|a| a.into()));
                run("sh", all).await
            }
        }
    }

    async fn run_shell(&self, command: &str) -> Result<()> {
        run("sh", ["-c", command]).await
    }

    async fn run_shell_in(&self, dir: &Path, command: &str) -> Result<()> {
        run_in(dir, "sh", ["-c", command]).await
    }

    async fn persist_path_entry(&self, _env: &HostEnv, dir: &Path) -> Result<()> {
        // /usr/local/bin may not exist on a fresh install.
        link_executables(dir, Path::new("/usr/local/bin"))
    }

    async fn register_worker_service(
        &self,
        settings: &WorkerSettings,
        env: &HostEnv,
    ) -> Result<()> {
        let agents_dir = dirs::home_dir()
            .ok_or_else(|| RigupError::Config("cannot resolve home directory".to_string()))?
            .join("Library/LaunchAgents");
        std::fs::create_dir_all(&agents_dir)?;

        let plist_path = agents_dir.join("com.rigup.worker.plist");
        let plist = worker::launchd_plist(settings, env, self.path_separator());
        std::fs::write(&plist_path, plist)?;

        run(
            "launchctl",
            [Path::new("load").as_os_str(), plist_path.as_os_str()],
        )
        .await
    }
}

async fn install_pkg(artifact: &Path) -> Result<()> {
    run(
        "installer",
        [
            Path::new("-pkg").as_os_str(),
            artifact.as_os_str(),
            Path::new("-target").as_os_str(),
            Path::new("/").as_os_str(),
        ],
    )
    .await
}

/// Attach the image, run the package found inside, detach.
///
/// The detach runs whether or not the install succeeded; leaving the image
/// attached at the fixed mountpoint would make the next attach fail.
async fn install_dmg(artifact: &Path) -> Result<()> {
    run(
        "hdiutil",
        [
            Path::new("attach").as_os_str(),
            Path::new("-nobrowse").as_os_str(),
            Path::new("-mountpoint").as_os_str(),
            Path::new(DMG_MOUNTPOINT).as_os_str(),
            artifact.as_os_str(),
        ],
    )
    .await?;

    let result = install_mounted(Path::new(DMG_MOUNTPOINT)).await;

    run("hdiutil", ["detach", DMG_MOUNTPOINT]).await?;
    result
}

/// Locate and run the package inside an attached image.
async fn install_mounted(mountpoint: &Path) -> Result<()> {
    let pkg = find_pkg(mountpoint)?;
    install_pkg(&pkg).await
}

fn find_pkg(mountpoint: &Path) -> Result<PathBuf> {
    for entry in std::fs::read_dir(mountpoint)? {
        let path = entry?.path();
        let is_pkg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pkg") || ext.eq_ignore_ascii_case("mpkg"));
        if is_pkg {
            return Ok(path);
        }
    }
    Err(RigupError::MissingArtifact(mountpoint.join("*.pkg")))
}
