use console::style;
use dialoguer::{Confirm, Input, Password};

use crate::config::AppConfig;
use crate::error::Result;
use crate::host;
use crate::worker::WorkerSettings;

pub async fn execute() -> Result<()> {
    println!("{}", style("🔧 Welcome to rigup!").bold().cyan());
    println!("Let's configure provisioning for this host.\n");

    let adapter = host::detect()?;
    println!(
        "Detected host OS: {}",
        style(adapter.name()).cyan().bold()
    );

    let install_prefix: String = Input::new()
        .with_prompt("Install prefix for unpacked archives")
        .default(adapter.install_prefix().display().to_string())
        .interact_text()?;

    let skip: String = Input::new()
        .with_prompt("Tool ids to skip, comma separated (optional)")
        .allow_empty(true)
        .interact_text()?;
    let skip: Vec<String> = skip
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let worker = if Confirm::new()
        .with_prompt("Register a CI worker on this host?")
        .default(false)
        .interact()?
    {
        let master_host: String = Input::new()
            .with_prompt("CI master host")
            .interact_text()?;
        let master_port: u16 = Input::new()
            .with_prompt("CI master port")
            .default(9989)
            .interact_text()?;
        let name: String = Input::new()
            .with_prompt("Worker name")
            .interact_text()?;
        let password = Password::new()
            .with_prompt("Worker password")
            .interact()?;

        Some(WorkerSettings {
            master_host,
            master_port,
            name,
            password,
            base_dir: None,
            command: "buildbot-worker start .".to_string(),
        })
    } else {
        None
    };

    let config = AppConfig {
        install_prefix: Some(install_prefix),
        skip,
        cookies: Default::default(),
        worker,
    };

    config.save()?;

    println!("\n{}", style("✓ Configuration saved!").green().bold());
    println!(
        "Config file: {}",
        style(AppConfig::config_path()?.display()).dim()
    );
    println!(
        "\nRun {} to provision this host.",
        style("rigup provision").cyan()
    );

    Ok(())
}
