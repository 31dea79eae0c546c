use console::style;

use crate::error::Result;
use crate::host;
use crate::installer::catalog::{catalog_for, Source};

pub async fn execute() -> Result<()> {
    let adapter = host::detect()?;
    let catalog = catalog_for(adapter.name());

    println!(
        "{} ({})",
        style("Tool catalog").bold(),
        style(adapter.name()).dim()
    );

    for tool in &catalog {
        let kind = match &tool.source {
            Source::Archive { .. } => "archive",
            Source::Installer { .. } => "installer",
            Source::Package { .. } => "package",
            Source::Script { .. } => "script",
        };
        println!(
            "  {} {:<12} {:<24} {}",
            style("•").cyan(),
            style(tool.id).bold(),
            tool.name,
            style(format!("{} ({})", tool.description, kind)).dim()
        );
    }

    Ok(())
}
