use console::style;

use crate::error::Result;
use crate::host;
use crate::hostenv::HostEnv;
use crate::installer::catalog::catalog_for;

/// Probe the catalog against the current search path without touching
/// anything.
pub async fn execute() -> Result<()> {
    let adapter = host::detect()?;
    let env = HostEnv::from_process();
    let catalog = catalog_for(adapter.name());

    println!(
        "{} ({})",
        style("Tool status").bold(),
        style(adapter.name()).dim()
    );

    let mut missing = 0;
    for tool in &catalog {
        match env.which(tool.probe) {
            Some(path) => println!(
                "  {} {:<24} {}",
                style("●").green(),
                tool.name,
                style(path.display()).dim()
            ),
            None => {
                missing += 1;
                println!(
                    "  {} {:<24} {}",
                    style("○").red(),
                    tool.name,
                    style("not found").dim()
                );
            }
        }
    }

    println!();
    if missing == 0 {
        println!("{} all {} tools present", style("✓").green().bold(), catalog.len());
    } else {
        println!(
            "{} {} of {} tools missing. Run {} to install them.",
            style("!").yellow().bold(),
            missing,
            catalog.len(),
            style("rigup provision").cyan()
        );
    }

    Ok(())
}
