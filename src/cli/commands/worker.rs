use console::style;

use crate::config::AppConfig;
use crate::error::{Result, RigupError};
use crate::host;
use crate::hostenv::HostEnv;
use crate::installer::InstallOutcome;
use crate::worker;

fn settings(config: &AppConfig) -> Result<&worker::WorkerSettings> {
    config.worker.as_ref().ok_or_else(|| {
        RigupError::Config(
            "no worker section in the config file. Run 'rigup init' to add one.".to_string(),
        )
    })
}

pub async fn install(config: &AppConfig) -> Result<()> {
    let adapter = host::detect()?;
    let settings = settings(config)?;
    let env = HostEnv::from_process();

    match worker::install(adapter.as_ref(), &env, settings).await? {
        InstallOutcome::Skipped => println!(
            "{} worker already installed in {}",
            style("●").green(),
            worker::worker_dir(settings)?.display()
        ),
        InstallOutcome::Installed => println!(
            "{} worker installed in {}",
            style("✓").green().bold(),
            worker::worker_dir(settings)?.display()
        ),
    }

    Ok(())
}

pub async fn start(config: &AppConfig) -> Result<()> {
    let adapter = host::detect()?;
    let settings = settings(config)?;

    println!(
        "{} starting worker: {}",
        style("→").cyan(),
        style(&settings.command).dim()
    );
    worker::start(adapter.as_ref(), settings).await
}
