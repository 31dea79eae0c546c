//! The provisioning run.
//!
//! Walks this host's tool catalog in order and pushes every entry through
//! the idempotent installer runner. Strictly sequential; the first failure
//! aborts the run and the host is re-provisioned after investigating.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use console::style;

use crate::archive;
use crate::config::AppConfig;
use crate::error::{Result, RigupError};
use crate::fetch;
use crate::host::{self, HostAdapter};
use crate::hostenv::HostEnv;
use crate::installer::catalog::{catalog_for, Source, ToolDef};
use crate::installer::{ensure_installed, InstallOutcome};

pub async fn execute(config: &AppConfig, skip: Vec<String>, dry_run: bool) -> Result<()> {
    let adapter = host::detect()?;
    let catalog = catalog_for(adapter.name());
    let skipped: HashSet<String> = config.skip.iter().cloned().chain(skip).collect();
    validate_skips(&catalog, &skipped)?;
    let prefix = config.install_prefix_for(adapter.as_ref());

    if dry_run {
        print_plan(&catalog, &skipped, &prefix);
        return Ok(());
    }

    let client = reqwest::Client::new();
    let mut env = HostEnv::from_process();
    let started = Instant::now();
    let mut installed = 0;
    let mut present = 0;

    for tool in &catalog {
        if skipped.contains(tool.id) {
            println!("  {} {}", style("○").dim(), style(tool.name).dim());
            continue;
        }

        let outcome = ensure_installed(
            tool.id,
            || Ok(env.which(tool.probe).is_some()),
            || install_tool(adapter.as_ref(), &client, config, &prefix, tool),
        )
        .await?;

        match outcome {
            InstallOutcome::Skipped => {
                present += 1;
                println!(
                    "  {} {} {}",
                    style("●").green(),
                    tool.name,
                    style("already installed").dim()
                );
            }
            InstallOutcome::Installed => {
                installed += 1;
                env = finalize_install(adapter.as_ref(), env, &prefix, tool).await?;
                println!("  {} {} {}", style("●").green(), tool.name, style("installed").cyan());
            }
        }
    }

    println!();
    println!(
        "{} {} installed, {} already present ({}s)",
        style("✓").green().bold(),
        installed,
        present,
        started.elapsed().as_secs()
    );

    Ok(())
}

async fn install_tool(
    adapter: &dyn HostAdapter,
    client: &reqwest::Client,
    config: &AppConfig,
    prefix: &Path,
    tool: &ToolDef,
) -> Result<()> {
    match &tool.source {
        Source::Package { names } => adapter.install_packages(names).await,
        Source::Script { command } => adapter.run_shell(command).await,
        Source::Archive { url, .. } => {
            let download = fetch::fetch(client, url, config.cookie_for(tool.id).as_deref()).await?;
            archive::unpack_async(download.path().to_path_buf(), prefix.to_path_buf()).await
            // `download` drops here; the temporary file is gone either way.
        }
        Source::Installer {
            url,
            args,
            needs_cookie,
        } => {
            let cookie = config.cookie_for(tool.id);
            if *needs_cookie && cookie.is_none() {
                return Err(RigupError::Config(format!(
                    "{} requires a license cookie; set cookies.{} in the config file or RIGUP_COOKIE_{}",
                    tool.name,
                    tool.id,
                    tool.id.to_ascii_uppercase().replace('-', "_")
                )));
            }
            let download = fetch::fetch(client, url, cookie.as_deref()).await?;
            adapter.run_installer(download.path(), args).await
        }
    }
}

/// PATH bookkeeping after a successful install: the archive's bin dir (and
/// any extra entry) is persisted on the host and added to the environment
/// value carried through the rest of the run. A directory the install was
/// expected to create but did not is a missing artifact, not a skip.
async fn finalize_install(
    adapter: &dyn HostAdapter,
    env: HostEnv,
    prefix: &Path,
    tool: &ToolDef,
) -> Result<HostEnv> {
    let mut env = env;

    if let Source::Archive { bin_dir, .. } = &tool.source {
        let dir = prefix.join(bin_dir);
        if !dir.is_dir() {
            return Err(RigupError::MissingArtifact(dir));
        }
        adapter.persist_path_entry(&env, &dir).await?;
        env = env.with_path_entry(dir);
    }

    if let Some(extra) = tool.path_entry {
        let dir = PathBuf::from(extra);
        if !dir.is_dir() {
            return Err(RigupError::MissingArtifact(dir));
        }
        adapter.persist_path_entry(&env, &dir).await?;
        env = env.with_path_entry(dir);
    }

    Ok(env)
}

/// A skip naming a tool this host's catalog does not have is a typo, not a
/// no-op.
fn validate_skips(catalog: &[ToolDef], skipped: &HashSet<String>) -> Result<()> {
    for id in skipped {
        if !catalog.iter().any(|tool| tool.id == *id) {
            return Err(RigupError::UnknownTool(id.clone()));
        }
    }
    Ok(())
}

fn print_plan(catalog: &[ToolDef], skipped: &HashSet<String>, prefix: &Path) {
    println!(
        "{} (install prefix: {})",
        style("Provisioning plan").bold(),
        style(prefix.display()).dim()
    );
    for tool in catalog {
        if skipped.contains(tool.id) {
            println!("  {} {} {}", style("○").dim(), tool.name, style("skipped").dim());
            continue;
        }
        let how = match &tool.source {
            Source::Archive { url, .. } => format!("unpack {}", url),
            Source::Installer { url, .. } => format!("run installer from {}", url),
            Source::Package { names } => format!("package install: {}", names.join(", ")),
            Source::Script { .. } => "bootstrap script".to_string(),
        };
        println!(
            "  {} {} {} {}",
            style("→").cyan(),
            tool.name,
            style("if missing:").dim(),
            how
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::worker::WorkerSettings;

    struct StubHost {
        persisted: AtomicUsize,
    }

    impl StubHost {
        fn new() -> Self {
            Self {
                persisted: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HostAdapter for StubHost {
        fn name(&self) -> &'static str {
            "linux"
        }
        fn path_separator(&self) -> char {
            ':'
        }
        fn install_prefix(&self) -> PathBuf {
            PathBuf::from("/opt")
        }
        async fn install_packages(&self, _names: &[&str]) -> Result<()> {
            Ok(())
        }
        async fn run_installer(&self, _artifact: &Path, _args: &[&str]) -> Result<()> {
            Ok(())
        }
        async fn run_shell(&self, _command: &str) -> Result<()> {
            Ok(())
        }
        async fn run_shell_in(&self, _dir: &Path, _command: &str) -> Result<()> {
            Ok(())
        }
        async fn persist_path_entry(&self, _env: &HostEnv, _dir: &Path) -> Result<()> {
            self.persisted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn register_worker_service(
            &self,
            _worker: &WorkerSettings,
            _env: &HostEnv,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn package_tool(path_entry: Option<&'static str>) -> ToolDef {
        ToolDef {
            id: "sevenzip",
            name: "7-Zip",
            description: "Archive tool",
            probe: "7z",
            source: Source::Package { names: &["7zip"] },
            path_entry,
        }
    }

    #[test]
    fn test_print_plan_does_not_panic() {
        let catalog = catalog_for("linux");
        let skipped: HashSet<String> = ["jdk".to_string()].into();
        print_plan(&catalog, &skipped, Path::new("/opt"));
    }

    #[test]
    fn test_validate_skips() {
        let catalog = catalog_for("linux");

        let known: HashSet<String> = ["jdk".to_string(), "maven".to_string()].into();
        validate_skips(&catalog, &known).unwrap();

        let unknown: HashSet<String> = ["jkd".to_string()].into();
        assert!(matches!(
            validate_skips(&catalog, &unknown),
            Err(RigupError::UnknownTool(id)) if id == "jkd"
        ));
    }

    #[tokio::test]
    async fn test_finalize_install_missing_path_entry_is_an_error() {
        let host = StubHost::new();
        let env = HostEnv::from_entries(vec![]);
        let tool = package_tool(Some("/nonexistent/rigup-bin"));

        let result = finalize_install(&host, env, Path::new("/opt"), &tool).await;
        assert!(matches!(
            result,
            Err(RigupError::MissingArtifact(dir)) if dir == Path::new("/nonexistent/rigup-bin")
        ));
        assert_eq!(host.persisted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_finalize_install_persists_existing_path_entry() {
        let host = StubHost::new();
        let env = HostEnv::from_entries(vec![]);
        let tool = package_tool(Some("/"));

        let env = finalize_install(&host, env, Path::new("/opt"), &tool)
            .await
            .unwrap();
        assert_eq!(env.entries(), &[PathBuf::from("/")]);
        assert_eq!(host.persisted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_finalize_install_missing_archive_bin_dir_is_an_error() {
        let host = StubHost::new();
        let env = HostEnv::from_entries(vec![]);
        let tool = ToolDef {
            id: "cmake",
            name: "CMake",
            description: "Build system generator",
            probe: "cmake",
            source: Source::Archive {
                url: "https://example.com/cmake.tar.gz",
                bin_dir: "cmake/bin",
            },
            path_entry: None,
        };

        let tmp = tempfile::tempdir().unwrap();
        let result = finalize_install(&host, env, tmp.path(), &tool).await;
        assert!(matches!(result, Err(RigupError::MissingArtifact(_))));
    }
}
